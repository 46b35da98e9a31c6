//! Location services for the order engine
//!
//! - Nominatim geocoding behind the core `Geocoder` trait
//! - A city table for when the provider has no answer
//! - Distance ranking of own branches and third-party listings

pub mod directory;
pub mod distance;
pub mod fallback;
pub mod geocoder;
pub mod resolver;

mod error;

pub use directory::BranchDirectory;
pub use distance::{haversine_km, round_km};
pub use error::{LocationError, Result};
pub use fallback::{CityFallback, CityMatch};
pub use geocoder::NominatimGeocoder;
pub use resolver::{normalize_query, query_variants, GeocodeSource, LocationResolver, ResolvedLocation};
