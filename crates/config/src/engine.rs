//! Engine tuning sections: classifier, matching, geocoding, nearby ranking, sessions

use serde::{Deserialize, Serialize};

use crate::constants::{classifier, endpoints, geocoding, matching, nearby, session};

/// Intent classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Consult the zero-shot endpoint before the keyword rules
    #[serde(default)]
    pub zero_shot_enabled: bool,

    /// Inference endpoint accepting `{inputs, parameters: {candidate_labels}}`
    #[serde(default)]
    pub zero_shot_endpoint: Option<String>,

    #[serde(default = "default_zero_shot_threshold")]
    pub zero_shot_threshold: f32,

    #[serde(default = "default_zero_shot_timeout_ms")]
    pub zero_shot_timeout_ms: u64,
}

fn default_zero_shot_threshold() -> f32 {
    classifier::ZERO_SHOT_THRESHOLD
}
fn default_zero_shot_timeout_ms() -> u64 {
    classifier::ZERO_SHOT_TIMEOUT_MS
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            zero_shot_enabled: false,
            zero_shot_endpoint: None,
            zero_shot_threshold: default_zero_shot_threshold(),
            zero_shot_timeout_ms: default_zero_shot_timeout_ms(),
        }
    }
}

/// Catalog matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    #[serde(default = "default_priority_boost")]
    pub priority_boost: f64,

    /// "sequence_ratio" or "levenshtein"
    #[serde(default = "default_metric")]
    pub metric: String,
}

fn default_fuzzy_threshold() -> f64 {
    matching::FUZZY_THRESHOLD
}
fn default_priority_boost() -> f64 {
    matching::PRIORITY_BOOST
}
fn default_metric() -> String {
    "sequence_ratio".to_string()
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            priority_boost: default_priority_boost(),
            metric: default_metric(),
        }
    }
}

/// Geocoding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// When false only the city table is used
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_true() -> bool {
    true
}
fn default_geocoder_endpoint() -> String {
    endpoints::NOMINATIM_SEARCH.to_string()
}
fn default_user_agent() -> String {
    endpoints::GEOCODER_USER_AGENT.to_string()
}
fn default_geocoder_timeout() -> u64 {
    geocoding::TIMEOUT_SECS
}
fn default_max_attempts() -> usize {
    geocoding::MAX_ATTEMPTS
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoder_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Nearby outlet ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyConfig {
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_max_listed")]
    pub max_listed: usize,

    #[serde(default = "default_command_radius_km")]
    pub command_radius_km: f64,

    #[serde(default = "default_nearest_branch_max_km")]
    pub nearest_branch_max_km: f64,
}

fn default_radius_km() -> f64 {
    nearby::DEFAULT_RADIUS_KM
}
fn default_limit() -> usize {
    nearby::DEFAULT_LIMIT
}
fn default_max_listed() -> usize {
    nearby::MAX_LISTED
}
fn default_command_radius_km() -> f64 {
    nearby::COMMAND_RADIUS_KM
}
fn default_nearest_branch_max_km() -> f64 {
    nearby::NEAREST_BRANCH_MAX_KM
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            limit: default_limit(),
            max_listed: default_max_listed(),
            command_radius_km: default_command_radius_km(),
            nearest_branch_max_km: default_nearest_branch_max_km(),
        }
    }
}

/// Session housekeeping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_location_ttl")]
    pub location_ttl_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_location_ttl() -> u64 {
    session::LOCATION_TTL_SECS
}
fn default_cleanup_interval() -> u64 {
    session::CLEANUP_INTERVAL_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            location_ttl_secs: default_location_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}
