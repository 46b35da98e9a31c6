//! Address resolution with a fallback chain
//!
//! provider (up to `max_attempts` query variants, each time-boxed) → city
//! table → default city. `geocode` therefore always yields a coordinate.

use order_engine_config::constants::geocoding;
use order_engine_core::text::{contains_any, squash_whitespace};
use order_engine_core::{Branch, GeoPoint, Geocoder, NearbyOption};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{BranchDirectory, CityFallback};

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeSource {
    Provider,
    CityTable,
    Default,
}

impl GeocodeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeSource::Provider => "provider",
            GeocodeSource::CityTable => "city_table",
            GeocodeSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub location: GeoPoint,
    pub label: String,
    pub source: GeocodeSource,
}

impl ResolvedLocation {
    pub fn is_fallback(&self) -> bool {
        self.source != GeocodeSource::Provider
    }
}

/// Adds the country when the text names none
pub fn normalize_query(address: &str) -> String {
    let address = squash_whitespace(address);
    if contains_any(&address.to_lowercase(), geocoding::COUNTRY_MARKERS) {
        address
    } else {
        format!("{}{}", address, geocoding::COUNTRY_SUFFIX)
    }
}

/// Provider queries in the order they are tried, without repeats
pub fn query_variants(address: &str) -> Vec<String> {
    let normalized = normalize_query(address);
    let simplified = normalized
        .to_lowercase()
        .replace("house no", "house")
        .replace("sector", "sect");

    let mut variants = vec![normalized];
    if !variants[0].eq_ignore_ascii_case(&simplified) {
        variants.push(simplified);
    }
    variants
}

pub struct LocationResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
    fallback: CityFallback,
    directory: BranchDirectory,
    attempt_timeout: Duration,
    max_attempts: usize,
}

impl LocationResolver {
    pub fn new(
        geocoder: Option<Arc<dyn Geocoder>>,
        fallback: CityFallback,
        directory: BranchDirectory,
        attempt_timeout: Duration,
        max_attempts: usize,
    ) -> Self {
        Self {
            geocoder,
            fallback,
            directory,
            attempt_timeout,
            max_attempts,
        }
    }

    pub fn directory(&self) -> &BranchDirectory {
        &self.directory
    }

    /// Resolve an address; never fails
    pub async fn geocode(&self, address: &str) -> ResolvedLocation {
        let variants = query_variants(address);

        if let Some(geocoder) = &self.geocoder {
            for query in variants.iter().take(self.max_attempts) {
                match tokio::time::timeout(self.attempt_timeout, geocoder.geocode(query)).await {
                    Ok(Ok(Some(place))) => {
                        tracing::debug!(%query, label = %place.label, "Geocoded");
                        return ResolvedLocation {
                            location: place.location,
                            label: place.label,
                            source: GeocodeSource::Provider,
                        };
                    },
                    Ok(Ok(None)) => {
                        tracing::debug!(%query, "Geocoder had no match");
                    },
                    Ok(Err(e)) => {
                        tracing::warn!(geocoder = geocoder.name(), %query, error = %e, "Geocoding attempt failed");
                    },
                    Err(_) => {
                        tracing::warn!(
                            geocoder = geocoder.name(),
                            %query,
                            timeout_ms = self.attempt_timeout.as_millis() as u64,
                            "Geocoding attempt timed out"
                        );
                    },
                }
            }
        }

        let city = self.fallback.locate(&variants[0]);
        let source = if city.is_default {
            GeocodeSource::Default
        } else {
            GeocodeSource::CityTable
        };
        metrics::counter!("order_engine_geocode_fallbacks_total", "source" => source.as_str())
            .increment(1);
        tracing::info!(label = %city.label, source = source.as_str(), "Using fallback location");

        ResolvedLocation {
            location: city.location,
            label: city.label,
            source,
        }
    }

    pub fn rank_nearby(&self, origin: GeoPoint, radius_km: f64, limit: usize) -> Vec<NearbyOption> {
        self.directory.rank_nearby(origin, radius_km, limit)
    }

    pub fn nearest_branch(&self, origin: GeoPoint, max_km: f64) -> Option<(&Branch, f64)> {
        self.directory.nearest_branch(origin, max_km)
    }
}
