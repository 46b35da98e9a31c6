//! Branch Configuration
//!
//! Own branches, third-party listings and the city fallback table, loaded from YAML.

use order_engine_core::{Branch, GeoPoint, ThirdPartyListing};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::constants::geocoding;
use crate::ConfigError;

const BUILTIN_BRANCHES: &str = include_str!("../../../../config/branches.yaml");

/// Branches configuration loaded from branches.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchesConfig {
    /// Own branch locations
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Informational listings of restaurants we do not operate
    #[serde(default)]
    pub third_party: Vec<ThirdPartyListing>,
    /// City centroids used when the geocoder gives no answer
    #[serde(default)]
    pub cities: Vec<CityEntry>,
    /// Used when no city matches
    #[serde(default = "default_city")]
    pub default_city: CityEntry,
}

/// A city centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Label reported when this entry is used; defaults to "{name}, Pakistan"
    #[serde(default)]
    pub label: Option<String>,
}

impl CityEntry {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.name, geocoding::COUNTRY_SUFFIX))
    }
}

fn default_city() -> CityEntry {
    CityEntry {
        name: "Karachi".to_string(),
        lat: 24.8607,
        lon: 67.0011,
        label: Some(geocoding::DEFAULT_LABEL.to_string()),
    }
}

impl Default for BranchesConfig {
    fn default() -> Self {
        Self {
            branches: Vec::new(),
            third_party: Vec::new(),
            cities: Vec::new(),
            default_city: default_city(),
        }
    }
}

impl BranchesConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("branches: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// The directory shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_BRANCHES)
    }

    /// Load `path` if given, otherwise the built-in directory
    pub fn load_or_builtin(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    /// Unique branch ids and coordinates in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for branch in &self.branches {
            if !ids.insert(branch.id) {
                return Err(ConfigError::InvalidValue {
                    field: "branches.id".to_string(),
                    message: format!("duplicate branch id {}", branch.id),
                });
            }
            check_point(&branch.name, branch.location)?;
        }
        for city in self.cities.iter().chain(std::iter::once(&self.default_city)) {
            check_point(&city.name, city.location())?;
        }
        Ok(())
    }

    pub fn get_branch(&self, branch_id: u32) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == branch_id)
    }

    pub fn active_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(|b| b.active)
    }
}

fn check_point(name: &str, point: GeoPoint) -> Result<(), ConfigError> {
    if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
        return Err(ConfigError::InvalidValue {
            field: "branches.location".to_string(),
            message: format!("{} has out-of-range coordinates {:?}", name, point),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_engine_core::ListingPosition;

    #[test]
    fn test_builtin_directory() {
        let config = BranchesConfig::builtin().unwrap();
        assert_eq!(config.branches.len(), 5);
        assert_eq!(config.branches[0].name, "Coffee Wagera Karachi");
        assert_eq!(config.cities.len(), 9);
        assert_eq!(config.third_party.len(), 3);
        assert_eq!(
            config.third_party[0].position,
            ListingPosition::Offset { dlat: 0.01, dlon: 0.01 }
        );
        assert_eq!(config.default_city.display_label(), "Karachi, Pakistan (Default)");
        assert_eq!(config.cities[1].display_label(), "Lahore, Pakistan");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
branches:
  - id: 1
    name: A
    address: a
    location: { lat: 24.0, lon: 67.0 }
    phone: "1"
  - id: 1
    name: B
    address: b
    location: { lat: 24.0, lon: 67.0 }
    phone: "2"
"#;
        assert!(BranchesConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let yaml = "cities:\n  - { name: Nowhere, lat: 124.0, lon: 67.0 }";
        assert!(BranchesConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_inactive_branches_filtered() {
        let mut config = BranchesConfig::builtin().unwrap();
        config.branches[0].active = false;
        assert_eq!(config.active_branches().count(), 4);
        assert!(config.get_branch(1).is_some());
    }
}
