use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ImageEditRequest {
    /// Base64 image payload, raw or as a data URL.
    pub image_data: String,
    pub prompt: String,
    /// Overwritten server-side with the sniffed format before the call.
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageEditResponse {
    pub image_data: String, // Base64 encoded
    pub mime_type: String,
    pub model: String,
}

/// Typed subset of the Gemini `generateContent` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: Option<String>,
    #[serde(rename = "inlineData")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// Error envelope the API returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
