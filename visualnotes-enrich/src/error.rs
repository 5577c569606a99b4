use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing API key: set {var}")]
    MissingApiKey { var: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl From<serde_json::Error> for EnrichError {
    fn from(e: serde_json::Error) -> Self {
        EnrichError::ParseError(e.to_string())
    }
}

impl From<url::ParseError> for EnrichError {
    fn from(e: url::ParseError) -> Self {
        EnrichError::InvalidUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;
