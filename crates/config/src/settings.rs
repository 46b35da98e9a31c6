//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::engine::{ClassifierConfig, GeocodingConfig, MatchingConfig, NearbyConfig, SessionConfig};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub nearby: NearbyConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Catalog and branch directory sources
    #[serde(default)]
    pub domain: DomainPaths,
}

/// Where sessions, orders and logs are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// Process-local maps
    #[default]
    Memory,
    /// Sessions, orders and location scratch as JSON files under `data_dir`,
    /// shared by workers on the same host
    File,
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: PersistenceBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::Memory,
            data_dir: default_data_dir(),
        }
    }
}

/// Catalog and branch file locations; `None` uses the built-in data
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DomainPaths {
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub branches_path: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins; empty allows any origin outside production
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_classifier()?;
        self.validate_matching()?;
        self.validate_geocoding()?;
        self.validate_nearby()?;
        self.validate_session()?;
        self.validate_production()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_classifier(&self) -> Result<(), ConfigError> {
        let classifier = &self.classifier;

        if !(0.0..=1.0).contains(&classifier.zero_shot_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "classifier.zero_shot_threshold".to_string(),
                message: format!(
                    "Must be between 0.0 and 1.0, got {}",
                    classifier.zero_shot_threshold
                ),
            });
        }

        if classifier.zero_shot_enabled && classifier.zero_shot_endpoint.is_none() {
            return Err(ConfigError::MissingField(
                "classifier.zero_shot_endpoint".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_matching(&self) -> Result<(), ConfigError> {
        let matching = &self.matching;

        if !(0.0..=1.0).contains(&matching.fuzzy_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "matching.fuzzy_threshold".to_string(),
                message: format!("Must be between 0.0 and 1.0, got {}", matching.fuzzy_threshold),
            });
        }

        if !(0.0..=0.5).contains(&matching.priority_boost) {
            return Err(ConfigError::InvalidValue {
                field: "matching.priority_boost".to_string(),
                message: format!("Must be between 0.0 and 0.5, got {}", matching.priority_boost),
            });
        }

        if !matches!(matching.metric.as_str(), "sequence_ratio" | "levenshtein") {
            return Err(ConfigError::InvalidValue {
                field: "matching.metric".to_string(),
                message: format!(
                    "Expected 'sequence_ratio' or 'levenshtein', got '{}'",
                    matching.metric
                ),
            });
        }

        Ok(())
    }

    fn validate_geocoding(&self) -> Result<(), ConfigError> {
        let geocoding = &self.geocoding;

        if geocoding.timeout_secs == 0 || geocoding.timeout_secs > 60 {
            return Err(ConfigError::InvalidValue {
                field: "geocoding.timeout_secs".to_string(),
                message: format!("Must be between 1 and 60, got {}", geocoding.timeout_secs),
            });
        }

        if geocoding.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "geocoding.max_attempts".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_nearby(&self) -> Result<(), ConfigError> {
        let nearby = &self.nearby;

        for (field, value) in [
            ("nearby.radius_km", nearby.radius_km),
            ("nearby.command_radius_km", nearby.command_radius_km),
            ("nearby.nearest_branch_max_km", nearby.nearest_branch_max_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be a positive distance, got {}", value),
                });
            }
        }

        if nearby.limit == 0 || nearby.max_listed == 0 {
            return Err(ConfigError::InvalidValue {
                field: "nearby.limit".to_string(),
                message: "limit and max_listed must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.location_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.location_ttl_secs".to_string(),
                message: "TTL must be at least 1 second".to_string(),
            });
        }

        if self.session.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.cleanup_interval_secs".to_string(),
                message: "Interval must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    /// Production refuses wildcard CORS
    fn validate_production(&self) -> Result<(), ConfigError> {
        if self.environment.is_production()
            && self.server.cors_enabled
            && self.server.cors_origins.is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "server.cors_origins".to_string(),
                message: "Explicit origins are required in production".to_string(),
            });
        }

        if !self.environment.is_strict() && self.geocoding.enabled && self.geocoding.user_agent.is_empty()
        {
            tracing::warn!("geocoding.user_agent is empty; the provider may reject requests");
        }

        Ok(())
    }
}

/// Load settings from files and environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("ORDER_ENGINE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
