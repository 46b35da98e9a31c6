//! Core traits for pluggable backends
//!
//! ```text
//! Text:
//!   - Classifier: message text → intent with confidence
//!
//! Location:
//!   - Geocoder: free-form address → coordinates
//! ```

mod classifier;
mod geocoder;

pub use classifier::Classifier;
pub use geocoder::{GeocodedPlace, Geocoder};
