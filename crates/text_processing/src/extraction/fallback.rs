//! Fallbacks when no quantity pattern matched: fixed phrases, then an alias scan

use order_engine_core::text::{contains_phrase, phrase_positions};
use order_engine_core::{CatalogIndex, ExtractedLine};
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

use super::{overlaps, LineSet};

/// Idiomatic phrases with a fixed meaning. The first phrase found wins.
const FIXED_PHRASES: &[(&str, &[&str])] = &[
    ("i want coffee", &["espresso"]),
    ("coffee please", &["espresso"]),
    ("give me coffee", &["espresso"]),
    ("i need coffee", &["espresso"]),
    ("coffee and cookie", &["espresso", "cookie"]),
    ("latte and croissant", &["latte", "croissant"]),
    ("cappuccino and muffin", &["cappuccino", "muffin"]),
];

/// Lines for the first fixed phrase present in `text`, one of each item
pub fn fixed_phrase(text: &str) -> Option<Vec<ExtractedLine>> {
    FIXED_PHRASES
        .iter()
        .find(|(phrase, _)| contains_phrase(text, phrase))
        .map(|(phrase, labels)| {
            tracing::debug!(phrase, "Fixed phrase matched");
            labels.iter().map(|l| ExtractedLine::new(*l, 1)).collect()
        })
}

/// Scan for catalog aliases, longest first.
///
/// Each occurrence is claimed once, so a shorter alias never re-matches
/// inside a longer one. The first occurrence per item takes an integer written
/// right before it as the quantity, otherwise 1. A written zero drops the item.
pub fn scan_aliases(text: &str, catalog: &CatalogIndex, number_suffix: &Regex) -> Vec<ExtractedLine> {
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();
    let mut lines = LineSet::default();

    for entry in catalog.aliases_longest_first() {
        for start in phrase_positions(text, &entry.alias) {
            let span = start..start + entry.alias.len();
            if overlaps(&claimed, &span) {
                continue;
            }
            claimed.push(span);

            if !seen.insert(entry.item_id) {
                continue;
            }
            let Some(item) = catalog.get(entry.item_id) else {
                continue;
            };

            let quantity = number_suffix
                .captures(&text[..start])
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(1);
            if quantity == 0 {
                continue;
            }

            tracing::debug!(alias = %entry.alias, item = %item.name, quantity, "Alias matched");
            lines.add(&item.name.to_lowercase(), quantity);
        }
    }

    lines.into_lines()
}
