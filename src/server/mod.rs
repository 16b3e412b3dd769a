pub mod handlers;

use crate::{config::Config, gemini::ImageEditor, models::EditSession};
use actix_web::{web, App, HttpServer};
use std::sync::{Arc, Mutex};

/// Shared application state: the editor seam and the single edit session.
///
/// The session mutex is only ever held for short bookkeeping sections and
/// never across the outbound call.
pub struct AppState {
    pub editor: Arc<dyn ImageEditor>,
    pub session: Mutex<EditSession>,
}

impl AppState {
    pub fn new(editor: Arc<dyn ImageEditor>) -> Self {
        Self {
            editor,
            session: Mutex::new(EditSession::new()),
        }
    }
}

// Base64 inflates a 4 MiB image to ~5.6 MiB, over the extractor's 2 MiB
// default. Oversize uploads must still reach validate_upload for their error
// message.
const JSON_PAYLOAD_LIMIT: usize = 16 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_PAYLOAD_LIMIT))
        .service(handlers::index)
        .service(handlers::session_snapshot)
        .service(handlers::edit)
        .service(handlers::result);
}

pub async fn run(config: Config, editor: Arc<dyn ImageEditor>) -> std::io::Result<()> {
    let (host, port) = config.bind_addr();
    let state = web::Data::new(AppState::new(editor));

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((host.as_str(), port))?
        .run()
        .await
}
