use crate::error::{RestyleError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Upload cap, matching the editor page's stated "PNG, JPG up to 4MB".
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Fixed name the edited image is downloaded as.
pub const DOWNLOAD_FILE_NAME: &str = "edited-employee-photo.png";

pub const OVERSIZE_MESSAGE: &str = "File size must be less than 4MB.";
pub const MISSING_INPUT_MESSAGE: &str = "Please upload an image and provide an editing prompt.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Detects the image format from magic bytes. The declared content type is
/// never trusted.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

/// Validates an upload before anything is sent over the network: size cap
/// first, then format sniffing.
pub fn validate_upload(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(RestyleError::ValidationError(
            MISSING_INPUT_MESSAGE.to_string(),
        ));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(RestyleError::ValidationError(OVERSIZE_MESSAGE.to_string()));
    }
    sniff_format(bytes).ok_or_else(|| {
        RestyleError::ValidationError("Only PNG and JPEG images are supported.".to_string())
    })
}

/// Strips a `data:<mime>;base64,` prefix if present. The page sends whatever
/// FileReader produced, which is a data URL.
pub fn strip_data_url(input: &str) -> &str {
    if input.starts_with("data:") {
        match input.split_once(',') {
            Some((_, b64)) => b64,
            None => input,
        }
    } else {
        input
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(strip_data_url(input).trim())
        .map_err(|e| RestyleError::ValidationError(format!("Invalid image data: {}", e)))
}
