use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Unexpected response shape from {provider}: {detail}")]
    UnexpectedShape { provider: String, detail: String },
    #[error("Image fetch failed for {url}: {reason}")]
    FetchError { url: String, reason: String },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Model error: {0}")]
    ModelError(String),
    #[error("Failed to parse model output: {0}")]
    ParseError(String),
    #[error("Deployment error: {0}")]
    DeployError(String),
    #[error("Website generation timed out after {}", format_deadline(.0))]
    Timeout(Duration),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GenError {
    pub fn unexpected_shape(provider: &str, detail: impl Into<String>) -> Self {
        GenError::UnexpectedShape {
            provider: provider.to_string(),
            detail: detail.into(),
        }
    }
}

fn format_deadline(deadline: &Duration) -> String {
    let secs = deadline.as_secs();
    if secs >= 60 && secs % 60 == 0 && deadline.subsec_nanos() == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{:?}", deadline)
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
