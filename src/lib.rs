pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod media;
pub mod models;
pub mod server;

pub use config::{Config, GeminiConfig};
pub use error::{RestyleError, Result};
pub use gemini::{EditClient, ImageEditor};
pub use models::{
    EditSession, EditStatus, EditedImage, ImageEditRequest, ImageEditResponse, SessionSnapshot,
    UploadedPhoto,
};
