//! Geocoding interface

use crate::{GeoPoint, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A provider answer for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub location: GeoPoint,
    pub label: String,
}

/// Resolves free-form addresses to coordinates
///
/// Implementations:
/// - `NominatimGeocoder` - OpenStreetMap search over HTTP
///
/// Callers own retries, timeouts and fallbacks; an implementation answers a
/// single query.
#[async_trait]
pub trait Geocoder: Send + Sync + 'static {
    /// `Ok(None)` when the provider has no match
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
