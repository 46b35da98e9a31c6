//! Catalog Configuration
//!
//! Product catalog snapshot loaded from YAML.

use order_engine_core::{CatalogIndex, CatalogItem};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

const BUILTIN_CATALOG: &str = include_str!("../../../../config/catalog.yaml");

/// Catalog snapshot loaded from catalog.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

impl CatalogConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("catalog: {}", e)))
    }

    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Load `path` if given, otherwise the built-in catalog
    pub fn load_or_builtin(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    /// Validate and build the alias index
    pub fn into_index(self) -> Result<CatalogIndex, ConfigError> {
        CatalogIndex::build(self.items).map_err(|e| ConfigError::InvalidValue {
            field: "catalog.items".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog() {
        let config = CatalogConfig::builtin().unwrap();
        assert_eq!(config.items.len(), 30);
        assert_eq!(config.items[0].name, "Espresso");
        assert_eq!(config.items[19].name, "Zinger Burger");
        assert_eq!(config.items[19].price, 550.0);

        let index = config.into_index().unwrap();
        assert_eq!(index.lookup_alias("expresso").unwrap().name, "Espresso");
        assert_eq!(index.lookup_alias("burger").unwrap().name, "Zinger Burger");
        assert_eq!(index.get(2).unwrap().priority, 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "items:\n  - id: 1\n    name: Kulfi\n    price: 120\n    category: Desserts\n    aliases: [malai kulfi]"
        )
        .unwrap();

        let config = CatalogConfig::load(file.path()).unwrap();
        assert_eq!(config.items.len(), 1);
        assert!(config.items[0].available);
        assert_eq!(config.items[0].priority, 0);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let config = CatalogConfig::from_yaml(
            "items:\n  - id: 1\n    name: Free Water\n    price: 0\n    category: Beverages",
        )
        .unwrap();
        assert!(matches!(
            config.into_index(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CatalogConfig::load("/nonexistent/catalog.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
