//! Location errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Geocoder request failed: {0}")]
    Http(String),

    #[error("Geocoder returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),

    #[error("Geocoder timed out after {0}ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for LocationError {
    fn from(err: reqwest::Error) -> Self {
        LocationError::Http(err.to_string())
    }
}

impl From<LocationError> for order_engine_core::Error {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Timeout(ms) => order_engine_core::Error::Timeout(ms),
            other => order_engine_core::Error::Geocoding(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LocationError>;
