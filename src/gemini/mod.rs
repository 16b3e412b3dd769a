pub mod edit_client;

use crate::{
    error::Result,
    models::{ImageEditRequest, ImageEditResponse},
};
use async_trait::async_trait;

pub use edit_client::EditClient;

/// The generative-image collaborator. The server only ever sees this trait,
/// so tests can substitute a local editor for the remote API.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit(&self, request: ImageEditRequest) -> Result<ImageEditResponse>;
}
