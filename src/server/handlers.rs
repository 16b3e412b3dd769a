use crate::{
    error::RestyleError,
    media,
    models::{EditedImage, ImageEditRequest, UploadedPhoto},
    server::AppState,
};
use actix_web::http::{header, StatusCode};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;

const BUSY_MESSAGE: &str = "An edit is already in progress.";

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../static/index.html"))
}

#[get("/api/session")]
pub async fn session_snapshot(state: web::Data<AppState>) -> impl Responder {
    let session = state.session.lock().unwrap();
    HttpResponse::Ok().json(session.snapshot())
}

#[post("/api/edit")]
pub async fn edit(
    state: web::Data<AppState>,
    body: web::Json<ImageEditRequest>,
) -> impl Responder {
    let body = body.into_inner();

    let prompt = body.prompt.trim().to_string();
    if prompt.is_empty() || body.image_data.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, media::MISSING_INPUT_MESSAGE);
    }

    let bytes = match media::decode_base64(&body.image_data) {
        Ok(bytes) => bytes,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let format = match media::validate_upload(&bytes) {
        Ok(format) => format,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let file_name = body
        .file_name
        .clone()
        .unwrap_or_else(|| "upload".to_string());

    {
        let mut session = state.session.lock().unwrap();
        if session.is_busy() {
            return error_response(StatusCode::CONFLICT, BUSY_MESSAGE);
        }
        session.set_original(UploadedPhoto {
            file_name: file_name.clone(),
            mime_type: format.mime_type().to_string(),
            byte_len: bytes.len(),
        });
        session.begin();
    }

    log::info!(
        "✨ Editing {} ({} bytes, {})",
        file_name,
        bytes.len(),
        format.mime_type()
    );

    let request = ImageEditRequest {
        image_data: media::encode_base64(&bytes),
        prompt,
        mime_type: Some(format.mime_type().to_string()),
        file_name: Some(file_name),
        model_id: body.model_id.clone(),
    };

    match state.editor.edit(request).await {
        Ok(response) => {
            let edited_bytes = match media::decode_base64(&response.image_data) {
                Ok(bytes) => bytes,
                Err(_) => {
                    let message = "The edited image could not be decoded.";
                    state.session.lock().unwrap().fail(message);
                    return error_response(StatusCode::BAD_GATEWAY, message);
                }
            };

            let mut session = state.session.lock().unwrap();
            session.complete(EditedImage {
                bytes: edited_bytes,
                mime_type: response.mime_type.clone(),
                model: response.model.clone(),
            });

            HttpResponse::Ok().json(json!({
                "image_data": response.image_data,
                "mime_type": response.mime_type,
                "model": response.model,
                "download_url": "/api/result",
            }))
        }
        Err(e) => {
            let message = e.to_string();
            log::error!("Edit failed: {}", message);
            state.session.lock().unwrap().fail(&message);
            error_response(status_for(&e), &message)
        }
    }
}

#[get("/api/result")]
pub async fn result(state: web::Data<AppState>) -> impl Responder {
    let session = state.session.lock().unwrap();
    match session.result() {
        Some(image) => HttpResponse::Ok()
            .content_type(image.mime_type.clone())
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", media::DOWNLOAD_FILE_NAME),
            ))
            .body(image.bytes.clone()),
        None => error_response(StatusCode::NOT_FOUND, "No edited image available."),
    }
}

fn status_for(error: &RestyleError) -> StatusCode {
    match error {
        RestyleError::ValidationError(_) | RestyleError::RequestError(_) => {
            StatusCode::BAD_REQUEST
        }
        RestyleError::ApiError(_) | RestyleError::ResponseError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Result,
        gemini::ImageEditor,
        models::ImageEditResponse,
        server::{configure, AppState},
    };
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MockEditor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockEditor {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageEditor for MockEditor {
        async fn edit(&self, _request: ImageEditRequest) -> Result<ImageEditResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RestyleError::ApiError(
                    "upstream rejected the request".to_string(),
                ))
            } else {
                Ok(ImageEditResponse {
                    image_data: media::encode_base64(b"ABC"),
                    mime_type: "image/png".to_string(),
                    model: "mock-model".to_string(),
                })
            }
        }
    }

    fn jpeg_payload(len: usize) -> String {
        let mut bytes = vec![0u8; len];
        bytes[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        media::encode_base64(&bytes)
    }

    fn edit_body(image_data: &str, prompt: &str) -> serde_json::Value {
        json!({
            "image_data": image_data,
            "prompt": prompt,
            "file_name": "photo.jpg",
        })
    }

    macro_rules! post_edit {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/edit")
                .set_json($body)
                .to_request();
            test::call_service(&$app, req).await
        }};
    }

    #[actix_web::test]
    async fn test_oversize_upload_never_reaches_editor() {
        let mock = MockEditor::new(false);
        let state = web::Data::new(AppState::new(mock.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let body = edit_body(&jpeg_payload(media::MAX_UPLOAD_BYTES + 1), "blur background");
        let resp = post_edit!(app, body);

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], media::OVERSIZE_MESSAGE);
        assert_eq!(mock.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_missing_prompt_rejected() {
        let mock = MockEditor::new(false);
        let state = web::Data::new(AppState::new(mock.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = post_edit!(app, edit_body(&jpeg_payload(64), "   "));

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], media::MISSING_INPUT_MESSAGE);
        assert_eq!(mock.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_unsupported_format_rejected() {
        let mock = MockEditor::new(false);
        let state = web::Data::new(AppState::new(mock.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let gif = media::encode_base64(b"GIF89a not a photo");
        let resp = post_edit!(app, edit_body(&gif, "blur background"));

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mock.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_corrupt_base64_rejected() {
        let mock = MockEditor::new(false);
        let state = web::Data::new(AppState::new(mock.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = post_edit!(app, edit_body("!!definitely not base64!!", "x"));

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mock.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_successful_edit_and_download() {
        let mock = MockEditor::new(false);
        let state = web::Data::new(AppState::new(mock.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = post_edit!(app, edit_body(&jpeg_payload(64), "blur background"));
        assert_eq!(resp.status(), StatusCode::OK);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["mime_type"], "image/png");
        assert_eq!(json["model"], "mock-model");
        assert_eq!(json["download_url"], "/api/result");
        assert_eq!(mock.call_count(), 1);

        let req = test::TestRequest::get().uri("/api/result").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains(media::DOWNLOAD_FILE_NAME));
        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"ABC");

        let req = test::TestRequest::get().uri("/api/session").to_request();
        let resp = test::call_service(&app, req).await;
        let snapshot: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(snapshot["has_result"], true);
        assert_eq!(snapshot["busy"], false);
        assert!(snapshot["error"].is_null());
    }

    #[actix_web::test]
    async fn test_failed_edit_surfaces_message_and_clears_result() {
        let failing = MockEditor::new(true);
        let state = web::Data::new(AppState::new(failing.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = post_edit!(app, edit_body(&jpeg_payload(64), "blur background"));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("upstream rejected the request"));

        // No stale image after a failure.
        let req = test::TestRequest::get().uri("/api/result").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_second_edit_while_busy_conflicts() {
        let mock = MockEditor::new(false);
        let state = web::Data::new(AppState::new(mock.clone()));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        state.session.lock().unwrap().begin();

        let resp = post_edit!(app, edit_body(&jpeg_payload(64), "blur background"));
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], BUSY_MESSAGE);
        assert_eq!(mock.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_result_before_any_edit_is_404() {
        let state = web::Data::new(AppState::new(MockEditor::new(false)));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/result").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
