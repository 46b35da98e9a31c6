//! OpenStreetMap Nominatim geocoder

use async_trait::async_trait;
use order_engine_config::GeocodingConfig;
use order_engine_core::{GeoPoint, GeocodedPlace, Geocoder};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{LocationError, Result};

/// One search hit; Nominatim encodes coordinates as strings
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl SearchHit {
    fn into_place(self) -> Result<GeocodedPlace> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| LocationError::InvalidResponse(format!("latitude '{}'", self.lat)))?;
        let lon: f64 = self
            .lon
            .parse()
            .map_err(|_| LocationError::InvalidResponse(format!("longitude '{}'", self.lon)))?;
        Ok(GeocodedPlace {
            location: GeoPoint::new(lat, lon),
            label: self.display_name,
        })
    }
}

/// Geocoder backed by the Nominatim search API
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn search(&self, query: &str) -> Result<Option<GeocodedPlace>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LocationError::Status { status, body });
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

        hits.into_iter().next().map(SearchHit::into_place).transpose()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> order_engine_core::Result<Option<GeocodedPlace>> {
        Ok(self.search(query).await?)
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}
