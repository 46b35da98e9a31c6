//! Static city table used when the geocoder has no answer

use order_engine_config::{BranchesConfig, CityEntry};
use order_engine_core::text::contains_phrase;
use order_engine_core::GeoPoint;

/// A city-table answer
#[derive(Debug, Clone, PartialEq)]
pub struct CityMatch {
    pub location: GeoPoint,
    pub label: String,
    /// True when no city matched and the default was used
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct CityFallback {
    cities: Vec<CityEntry>,
    default_city: CityEntry,
}

impl CityFallback {
    pub fn new(cities: Vec<CityEntry>, default_city: CityEntry) -> Self {
        Self {
            cities,
            default_city,
        }
    }

    pub fn from_config(config: &BranchesConfig) -> Self {
        Self::new(config.cities.clone(), config.default_city.clone())
    }

    /// First city named in `address`, or the default
    pub fn locate(&self, address: &str) -> CityMatch {
        let lowered = address.to_lowercase();
        match self
            .cities
            .iter()
            .find(|c| contains_phrase(&lowered, &c.name.to_lowercase()))
        {
            Some(city) => CityMatch {
                location: city.location(),
                label: city.display_label(),
                is_default: false,
            },
            None => CityMatch {
                location: self.default_city.location(),
                label: self.default_city.display_label(),
                is_default: true,
            },
        }
    }
}
