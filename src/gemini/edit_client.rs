use crate::{
    config::GeminiConfig,
    error::{RestyleError, Result},
    gemini::ImageEditor,
    logger,
    media,
    models::{ApiErrorResponse, GenerateContentResponse, ImageEditRequest, ImageEditResponse, InlineData},
};
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug)]
pub struct EditClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    default_model: Option<String>,
}

impl EditClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config.api_key.ok_or_else(|| {
            RestyleError::ConfigError("GEMINI_API_KEY is not set".to_string())
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_model: config.model,
        })
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (
                "gemini-2.5-flash-image-preview",
                "Gemini 2.5 Flash Image",
                "Google",
            ),
            (
                "gemini-2.0-flash-preview-image-generation",
                "Gemini 2.0 Flash Image Generation",
                "Google",
            ),
        ]
    }

    fn resolve_model<'a>(&'a self, request: &'a ImageEditRequest) -> &'a str {
        request
            .model_id
            .as_deref()
            .or(self.default_model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    fn build_request_payload(
        request: &ImageEditRequest,
        model_id: &str,
        mime_type: &str,
    ) -> Result<serde_json::Value> {
        let image_data = media::strip_data_url(&request.image_data);

        match model_id {
            "gemini-2.5-flash-image-preview" | "gemini-2.0-flash-preview-image-generation" => {
                Ok(json!({
                    "contents": [{
                        "parts": [
                            {
                                "inlineData": {
                                    "mimeType": mime_type,
                                    "data": image_data
                                }
                            },
                            { "text": request.prompt }
                        ]
                    }],
                    "generationConfig": {
                        "responseModalities": ["TEXT", "IMAGE"]
                    }
                }))
            }
            _ => Err(RestyleError::RequestError("Unsupported image model".into())),
        }
    }

    fn extract_image(response: GenerateContentResponse, model_id: &str) -> Result<InlineData> {
        let mut refusal_text = None;

        for candidate in response.candidates {
            let Some(content) = candidate.content else {
                continue;
            };
            for part in content.parts {
                if let Some(inline) = part.inline_data {
                    return Ok(inline);
                }
                if refusal_text.is_none() {
                    refusal_text = part.text;
                }
            }
        }

        log::warn!("Model {} returned no image part", model_id);
        match refusal_text {
            Some(text) => Err(RestyleError::ResponseError(format!(
                "The model did not return an image: {}",
                text
            ))),
            None => Err(RestyleError::ResponseError(
                "The model did not return an image".into(),
            )),
        }
    }
}

#[async_trait]
impl ImageEditor for EditClient {
    async fn edit(&self, request: ImageEditRequest) -> Result<ImageEditResponse> {
        let model_id = self.resolve_model(&request).to_string();
        let mime_type = request
            .mime_type
            .clone()
            .unwrap_or_else(|| "image/png".to_string());

        let payload = Self::build_request_payload(&request, &model_id, &mime_type)?;
        let request_json = serde_json::to_string(&payload)
            .map_err(|e| RestyleError::SerializationError(e.to_string()))?;

        log::info!("Editing image with model: {}", model_id);
        log::debug!("Prompt: {}", request.prompt);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model_id
        );

        let timer = logger::timer("gemini edit");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .body(request_json)
            .send()
            .await
            .map_err(|e| RestyleError::ApiError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RestyleError::ResponseError(e.to_string()))?;
        drop(timer);

        if !status.is_success() {
            log::error!("Gemini API returned {}: {}", status, body);
            // Surface the remote message verbatim when the error envelope parses.
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(RestyleError::ApiError(message));
        }

        let content: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| RestyleError::ResponseError(e.to_string()))?;

        let image = Self::extract_image(content, &model_id)?;

        Ok(ImageEditResponse {
            image_data: image.data,
            mime_type: image.mime_type,
            model: model_id,
        })
    }
}
