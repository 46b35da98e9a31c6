//! Engine Configuration Types
//!
//! Runtime knobs for `OrderEngine`, derived from the loaded `Settings`.

use order_engine_config::{NearbyConfig, Settings};
use order_engine_text_processing::{MatcherConfig, SimilarityMetric};
use std::time::Duration;

use crate::EngineError;

/// Conversation entries returned by default from `conversation_history`
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Catalog matching thresholds and metric
    pub matcher: MatcherConfig,
    /// Outlet ranking radii and list sizes
    pub nearby: NearbyConfig,
    /// How long a presented outlet list stays selectable
    pub location_ttl: Duration,
    /// Cap on conversation entries returned by history queries
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            nearby: NearbyConfig::default(),
            location_ttl: Duration::from_secs(
                order_engine_config::constants::session::LOCATION_TTL_SECS,
            ),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let metric = SimilarityMetric::from_str(&settings.matching.metric).ok_or_else(|| {
            EngineError::Config(format!(
                "unknown similarity metric '{}'",
                settings.matching.metric
            ))
        })?;

        Ok(Self {
            matcher: MatcherConfig {
                fuzzy_threshold: settings.matching.fuzzy_threshold,
                priority_boost: settings.matching.priority_boost,
                metric,
            },
            nearby: settings.nearby.clone(),
            location_ttl: Duration::from_secs(settings.session.location_ttl_secs),
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    /// Scratch TTL as the chrono duration stored on `PendingLocation`
    pub(crate) fn scratch_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.location_ttl).unwrap_or_else(|_| {
            chrono::Duration::seconds(
                order_engine_config::constants::session::LOCATION_TTL_SECS as i64,
            )
        })
    }
}
