//! Conversational order engine
//!
//! Features:
//! - Per-customer conversation state machine, from first message to confirmation
//! - Intent routing with a keyword fallback
//! - Item extraction and catalog validation into draft orders
//! - Address resolution and outlet selection
//! - Order tracking, menu and branch information
//! - Conversation log and order history

pub mod engine;
pub mod engine_config;
pub mod routing;
pub mod templates;

pub use engine::OrderEngine;
pub use engine_config::EngineConfig;
pub use routing::{AddressInput, Command, MessageRouter, NearbyQuery};

use thiserror::Error;

/// Engine errors
///
/// These never escape `handle_message`; they are logged and turned into a
/// customer-facing reply with the state left as it was.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Text processing error: {0}")]
    TextProcessing(String),

    #[error("Location error: {0}")]
    Location(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout")]
    Timeout,
}

impl From<order_engine_persistence::PersistenceError> for EngineError {
    fn from(err: order_engine_persistence::PersistenceError) -> Self {
        EngineError::Storage(err.to_string())
    }
}

impl From<order_engine_text_processing::TextProcessingError> for EngineError {
    fn from(err: order_engine_text_processing::TextProcessingError) -> Self {
        EngineError::TextProcessing(err.to_string())
    }
}

impl From<order_engine_location::LocationError> for EngineError {
    fn from(err: order_engine_location::LocationError) -> Self {
        EngineError::Location(err.to_string())
    }
}

impl From<order_engine_config::ConfigError> for EngineError {
    fn from(err: order_engine_config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<regex::Error> for EngineError {
    fn from(err: regex::Error) -> Self {
        EngineError::Config(format!("invalid pattern: {}", err))
    }
}

impl From<order_engine_core::Error> for EngineError {
    fn from(err: order_engine_core::Error) -> Self {
        match err {
            order_engine_core::Error::Storage(msg) => EngineError::Storage(msg),
            order_engine_core::Error::InvalidTransition { .. } => EngineError::State(err.to_string()),
            order_engine_core::Error::Timeout(_) => EngineError::Timeout,
            order_engine_core::Error::Geocoding(msg) => EngineError::Location(msg),
            other => EngineError::TextProcessing(other.to_string()),
        }
    }
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
