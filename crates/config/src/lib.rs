//! Configuration management for the order engine
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (ORDER_ENGINE_ prefix, `__` separator)
//!
//! Domain data (catalog and branch directory) lives in `domain`.

pub mod constants;
pub mod domain;
pub mod engine;
pub mod settings;

pub use domain::{BranchesConfig, CatalogConfig, CityEntry};
pub use engine::{ClassifierConfig, GeocodingConfig, MatchingConfig, NearbyConfig, SessionConfig};
pub use settings::{
    load_settings, DomainPaths, ObservabilityConfig, PersistenceBackend, PersistenceConfig,
    RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
