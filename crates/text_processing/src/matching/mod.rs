//! Menu matching
//!
//! Resolves a free-text label to a catalog item through six steps; the first
//! step that hits wins:
//!
//! 1. exact name (case-insensitive)
//! 2. exact alias
//! 3. label and name contain one another
//! 4. an alias occurs in the label
//! 5. best fuzzy similarity above the threshold, boosted by popularity
//! 6. most shared whole words with a name

mod similarity;

pub use similarity::{
    levenshtein_distance, levenshtein_ratio, sequence_ratio, SimilarityMetric,
};

use order_engine_core::text::{contains_phrase, words};
use order_engine_core::{CatalogIndex, CatalogItem, ExtractedLine, ResolvedLine};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Matcher tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// A fuzzy score must exceed this to match
    pub fuzzy_threshold: f64,
    /// Added per popularity tier before comparing against the threshold
    pub priority_boost: f64,
    pub metric: SimilarityMetric,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            priority_boost: 0.05,
            metric: SimilarityMetric::SequenceRatio,
        }
    }
}

/// Which step produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStep {
    ExactName,
    ExactAlias,
    Substring,
    AliasInLabel,
    Fuzzy,
    TokenOverlap,
}

/// A resolved label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuMatch {
    pub item_id: u32,
    pub step: MatchStep,
    /// 1.0 for exact steps; the boosted similarity for fuzzy; shared words for overlap
    pub score: f64,
}

/// Outcome of validating a batch of extracted lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// One line per catalog item, quantities summed, prices captured now
    pub resolved: Vec<ResolvedLine>,
    /// Labels nothing matched, in input order
    pub unresolved: Vec<String>,
}

impl ValidationReport {
    pub fn total_amount(&self) -> f64 {
        self.resolved.iter().map(ResolvedLine::line_total).sum()
    }
}

/// Resolves labels against a catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct MenuMatcher {
    config: MatcherConfig,
}

impl MenuMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Resolve one label
    pub fn match_label(&self, label: &str, catalog: &CatalogIndex) -> Option<MenuMatch> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }

        let hit = |item: &CatalogItem, step| MenuMatch {
            item_id: item.id,
            step,
            score: 1.0,
        };

        if let Some(item) = catalog.find_by_name(&label) {
            return Some(hit(item, MatchStep::ExactName));
        }

        if let Some(item) = catalog.lookup_alias(&label) {
            return Some(hit(item, MatchStep::ExactAlias));
        }

        if let Some(item) = catalog.available().find(|item| {
            let name = item.name.to_lowercase();
            name.contains(&label) || label.contains(&name)
        }) {
            return Some(hit(item, MatchStep::Substring));
        }

        if let Some(entry) = catalog
            .alias_entries()
            .iter()
            .find(|entry| contains_phrase(&label, &entry.alias))
        {
            return Some(MenuMatch {
                item_id: entry.item_id,
                step: MatchStep::AliasInLabel,
                score: 1.0,
            });
        }

        if let Some(found) = self.fuzzy_match(&label, catalog) {
            return Some(found);
        }

        self.token_overlap(&label, catalog)
    }

    fn fuzzy_match(&self, label: &str, catalog: &CatalogIndex) -> Option<MenuMatch> {
        let mut best: Option<MenuMatch> = None;
        let mut best_score = self.config.fuzzy_threshold;

        for item in catalog.available() {
            let similarity = self.config.metric.score(label, &item.name.to_lowercase());
            let boosted = similarity + item.priority as f64 * self.config.priority_boost;
            if boosted > best_score {
                best_score = boosted;
                best = Some(MenuMatch {
                    item_id: item.id,
                    step: MatchStep::Fuzzy,
                    score: boosted,
                });
            }
        }

        best
    }

    fn token_overlap(&self, label: &str, catalog: &CatalogIndex) -> Option<MenuMatch> {
        let label_words: HashSet<String> = words(label).into_iter().collect();
        let mut best: Option<MenuMatch> = None;
        let mut best_overlap = 0;

        for item in catalog.available() {
            let overlap = words(&item.name)
                .into_iter()
                .collect::<HashSet<_>>()
                .intersection(&label_words)
                .count();
            if overlap > best_overlap {
                best_overlap = overlap;
                best = Some(MenuMatch {
                    item_id: item.id,
                    step: MatchStep::TokenOverlap,
                    score: overlap as f64,
                });
            }
        }

        best
    }

    /// Validate extracted lines, capturing current prices
    pub fn validate(&self, lines: &[ExtractedLine], catalog: &CatalogIndex) -> ValidationReport {
        let mut report = ValidationReport::default();

        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            let item = self
                .match_label(&line.raw_label, catalog)
                .and_then(|m| catalog.get(m.item_id));

            match item {
                Some(item) => {
                    tracing::debug!(label = %line.raw_label, item = %item.name, "Validated line");
                    if let Some(existing) = report
                        .resolved
                        .iter_mut()
                        .find(|r| r.catalog_item_id == item.id)
                    {
                        existing.quantity += line.quantity;
                    } else {
                        report.resolved.push(ResolvedLine {
                            catalog_item_id: item.id,
                            name: item.name.clone(),
                            quantity: line.quantity,
                            unit_price: item.price,
                        });
                    }
                },
                None => {
                    tracing::debug!(label = %line.raw_label, "No catalog match");
                    report.unresolved.push(line.raw_label.clone());
                },
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, name: &str, price: f64, category: &str, priority: u8, aliases: &[&str]) -> CatalogItem {
        CatalogItem {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
            available: true,
            priority,
            description: None,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalog() -> CatalogIndex {
        CatalogIndex::build(vec![
            item(1, "Espresso", 250.0, "Coffee", 1, &["expresso", "black coffee"]),
            item(2, "Cappuccino", 350.0, "Coffee", 1, &["cappucino", "frothy"]),
            item(3, "Latte", 400.0, "Coffee", 1, &["late"]),
            item(6, "Hot Chocolate", 400.0, "Beverages", 3, &["cocoa"]),
            item(9, "Cookie", 150.0, "Pastries", 3, &["biscuit"]),
            item(12, "Sandwich", 450.0, "Food", 1, &["burger"]),
            item(13, "Club Sandwich", 550.0, "Food", 0, &[]),
            item(20, "Zinger Burger", 550.0, "Fast Food", 0, &[]),
            item(21, "Chicken Biryani", 450.0, "Main Course", 0, &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_steps_in_order() {
        let matcher = MenuMatcher::default();
        let catalog = catalog();

        let m = matcher.match_label("LATTE", &catalog).unwrap();
        assert_eq!((m.item_id, m.step), (3, MatchStep::ExactName));

        let m = matcher.match_label("expresso", &catalog).unwrap();
        assert_eq!((m.item_id, m.step), (1, MatchStep::ExactAlias));

        let m = matcher.match_label("zinger", &catalog).unwrap();
        assert_eq!((m.item_id, m.step), (20, MatchStep::ExactAlias));

        let m = matcher.match_label("chicken biryani plate", &catalog).unwrap();
        assert_eq!((m.item_id, m.step), (21, MatchStep::Substring));

        let m = matcher.match_label("large cocoa mug", &catalog).unwrap();
        assert_eq!((m.item_id, m.step), (6, MatchStep::AliasInLabel));
    }

    #[test]
    fn test_fuzzy_with_boost() {
        let matcher = MenuMatcher::default();
        let m = matcher.match_label("capuchino", &catalog()).unwrap();
        assert_eq!((m.item_id, m.step), (2, MatchStep::Fuzzy));
        assert!(m.score > 0.6);
    }

    #[test]
    fn test_levenshtein_metric() {
        let matcher = MenuMatcher::new(MatcherConfig {
            metric: SimilarityMetric::Levenshtein,
            ..MatcherConfig::default()
        });
        let m = matcher.match_label("cookei", &catalog()).unwrap();
        assert_eq!((m.item_id, m.step), (9, MatchStep::Fuzzy));
    }

    #[test]
    fn test_no_match() {
        let matcher = MenuMatcher::default();
        assert!(matcher.match_label("pizza", &catalog()).is_none());
        assert!(matcher.match_label("   ", &catalog()).is_none());
    }

    #[test]
    fn test_alias_not_matched_inside_words() {
        // "late" must not fire inside "chocolate"
        let matcher = MenuMatcher::default();
        let m = matcher.match_label("dark chocolate bar", &catalog()).unwrap();
        assert_eq!(m.item_id, 6);
    }

    #[test]
    fn test_validate_batch() {
        let matcher = MenuMatcher::default();
        let lines = vec![
            ExtractedLine::new("cappuccino", 2),
            ExtractedLine::new("cookie", 1),
            ExtractedLine::new("pizza", 1),
            ExtractedLine::new("biscuit", 2),
        ];
        let report = matcher.validate(&lines, &catalog());

        assert_eq!(report.resolved.len(), 2);
        assert_eq!(report.resolved[0].quantity, 2);
        assert_eq!(report.resolved[1].name, "Cookie");
        assert_eq!(report.resolved[1].quantity, 3);
        assert_eq!(report.unresolved, vec!["pizza"]);
        assert_eq!(report.total_amount(), 2.0 * 350.0 + 3.0 * 150.0);
    }
}
