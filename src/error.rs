use std::fmt;

#[derive(Debug)]
pub enum RestyleError {
    ConfigError(String),
    ValidationError(String),
    RequestError(String),
    ResponseError(String),
    SerializationError(String),
    InternalError(String),
    ApiError(String),
}

impl fmt::Display for RestyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestyleError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            RestyleError::ValidationError(msg) => write!(f, "{}", msg),
            RestyleError::RequestError(msg) => write!(f, "Request error: {}", msg),
            RestyleError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            RestyleError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            RestyleError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            RestyleError::ApiError(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl std::error::Error for RestyleError {}

pub type Result<T> = std::result::Result<T, RestyleError>;
