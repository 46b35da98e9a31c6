//! Catalog items and the immutable alias index built over them
//!
//! The index is built once per catalog snapshot. A refresh builds a new
//! index and swaps it in wholesale; nothing mutates an index after `build`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

fn default_available() -> bool {
    true
}

/// A sellable product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub name: String,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Popularity tier, higher is more popular. Boosts fuzzy matches.
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub description: Option<String>,
    /// Hand-curated synonyms on input; the full expanded alias list once indexed
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Where an alias came from. Lower variants win when two items share an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasSource {
    Name,
    NameWord,
    Synonym,
    Category,
}

/// One alias pointing at one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias: String,
    pub item_id: u32,
    pub source: AliasSource,
}

/// Expand an item into its ordered, deduplicated alias list.
///
/// Order: lowercase name, category, "category item", name words longer than
/// two characters, then curated synonyms.
pub fn expand_aliases(item: &CatalogItem) -> Vec<(String, AliasSource)> {
    let name = item.name.trim().to_lowercase();
    let category = item.category.trim().to_lowercase();

    let mut candidates = vec![
        (name.clone(), AliasSource::Name),
        (category.clone(), AliasSource::Category),
        (format!("{} item", category), AliasSource::Category),
    ];
    candidates.extend(
        name.split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .map(|w| (w.to_string(), AliasSource::NameWord)),
    );
    candidates.extend(
        item.aliases
            .iter()
            .map(|a| (a.trim().to_lowercase(), AliasSource::Synonym)),
    );

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|(alias, _)| !alias.is_empty() && seen.insert(alias.clone()))
        .collect()
}

/// Immutable lookup structure over a catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    items: Vec<CatalogItem>,
    positions: HashMap<u32, usize>,
    alias_map: HashMap<String, u32>,
    /// Available items' aliases in precedence order
    entries: Vec<AliasEntry>,
}

impl CatalogIndex {
    /// Validate the items and build every lookup table
    pub fn build(items: Vec<CatalogItem>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(items.len());
        let mut expanded = Vec::with_capacity(items.len());
        let mut per_item: Vec<Vec<(String, AliasSource)>> = Vec::with_capacity(items.len());

        for (idx, mut item) in items.into_iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!("item {} has an empty name", item.id)));
            }
            if !item.price.is_finite() || item.price <= 0.0 {
                return Err(Error::InvalidCatalog(format!(
                    "item '{}' has non-positive price {}",
                    item.name, item.price
                )));
            }
            if positions.insert(item.id, idx).is_some() {
                return Err(Error::InvalidCatalog(format!("duplicate item id {}", item.id)));
            }

            let aliases = expand_aliases(&item);
            item.aliases = aliases.iter().map(|(a, _)| a.clone()).collect();
            per_item.push(aliases);
            expanded.push(item);
        }

        let mut entries: Vec<AliasEntry> = Vec::new();
        for source in [
            AliasSource::Name,
            AliasSource::NameWord,
            AliasSource::Synonym,
            AliasSource::Category,
        ] {
            for (item, aliases) in expanded.iter().zip(&per_item) {
                if !item.available {
                    continue;
                }
                entries.extend(aliases.iter().filter(|(_, s)| *s == source).map(|(alias, _)| {
                    AliasEntry {
                        alias: alias.clone(),
                        item_id: item.id,
                        source,
                    }
                }));
            }
        }

        let mut alias_map = HashMap::new();
        for entry in &entries {
            alias_map.entry(entry.alias.clone()).or_insert(entry.item_id);
        }

        tracing::debug!(
            items = expanded.len(),
            aliases = alias_map.len(),
            "Built catalog index"
        );

        Ok(Self {
            items: expanded,
            positions,
            alias_map,
            entries,
        })
    }

    /// All items in catalog order, including unavailable ones
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items that can currently be ordered
    pub fn available(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|i| i.available)
    }

    pub fn get(&self, id: u32) -> Option<&CatalogItem> {
        self.positions.get(&id).map(|&idx| &self.items[idx])
    }

    /// Case-insensitive exact name lookup over available items
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogItem> {
        let needle = name.trim().to_lowercase();
        self.available().find(|i| i.name.to_lowercase() == needle)
    }

    /// Case-insensitive exact alias lookup, honoring alias precedence
    pub fn lookup_alias(&self, alias: &str) -> Option<&CatalogItem> {
        self.alias_map
            .get(&alias.trim().to_lowercase())
            .and_then(|&id| self.get(id))
    }

    /// Alias entries of available items in precedence order
    pub fn alias_entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// Alias entries sorted longest first, ties kept in precedence order
    pub fn aliases_longest_first(&self) -> Vec<&AliasEntry> {
        let mut sorted: Vec<&AliasEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.alias.chars().count().cmp(&a.alias.chars().count()));
        sorted
    }

    /// Categories of available items in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.available()
            .map(|i| i.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
