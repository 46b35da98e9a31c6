//! Text processing errors

use thiserror::Error;

/// Errors from classifiers, extractors and their backends
#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl From<regex::Error> for TextProcessingError {
    fn from(err: regex::Error) -> Self {
        TextProcessingError::Pattern(err.to_string())
    }
}

impl From<reqwest::Error> for TextProcessingError {
    fn from(err: reqwest::Error) -> Self {
        TextProcessingError::Network(err.to_string())
    }
}

impl From<TextProcessingError> for order_engine_core::Error {
    fn from(err: TextProcessingError) -> Self {
        match err {
            TextProcessingError::Timeout(ms) => order_engine_core::Error::Timeout(ms),
            other => order_engine_core::Error::Classifier(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TextProcessingError>;
