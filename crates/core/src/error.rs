//! Core error type shared across crates

use thiserror::Error;

use crate::conversation::ConversationState;

/// Errors raised by core types and the pluggable backends they describe
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: ConversationState,
        to: ConversationState,
    },

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
