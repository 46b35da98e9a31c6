//! Item extraction
//!
//! Pulls `{label, quantity}` lines out of free text. Quantity patterns run in
//! tiers; a span consumed by a higher tier cannot be claimed again. When no
//! tier yields a line, fixed phrases and then a catalog alias scan take over.

pub mod cleaning;
mod fallback;

pub use cleaning::{clean_label, strip_stop_words};

use order_engine_core::{CatalogIndex, ExtractedLine};
use regex::{Captures, Regex};
use std::ops::Range;

use crate::matching::SimilarityMetric;
use crate::numbers::word_to_number;
use crate::Result;

/// A quantity pattern and how to read lines out of its captures
struct Tier {
    name: &'static str,
    pattern: Regex,
    /// (quantity group, label group) pairs
    groups: &'static [(usize, usize)],
}

impl Tier {
    fn new(name: &'static str, pattern: &str, groups: &'static [(usize, usize)]) -> Result<Self> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            groups,
        })
    }
}

/// Lines merged by lowercase label, first-seen order
#[derive(Debug, Default)]
pub(crate) struct LineSet {
    lines: Vec<ExtractedLine>,
}

impl LineSet {
    pub(crate) fn add(&mut self, label: &str, quantity: u32) {
        let label = label.to_lowercase();
        match self.lines.iter_mut().find(|l| l.raw_label == label) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(ExtractedLine::new(label, quantity)),
        }
    }

    pub(crate) fn into_lines(self) -> Vec<ExtractedLine> {
        self.lines
    }
}

pub(crate) fn overlaps(claimed: &[Range<usize>], span: &Range<usize>) -> bool {
    claimed
        .iter()
        .any(|c| c.start < span.end && span.start < c.end)
}

/// Extracts order lines from message text
pub struct ItemExtractor {
    tiers: Vec<Tier>,
    number_suffix: Regex,
    metric: SimilarityMetric,
    fuzzy_threshold: f64,
}

impl ItemExtractor {
    pub fn new(metric: SimilarityMetric, fuzzy_threshold: f64) -> Result<Self> {
        let tiers = vec![
            Tier::new(
                "conjunction",
                r"(\d+)\s+([a-zA-Z\s]+)\s+and\s+(\d+)\s+([a-zA-Z\s]+)",
                &[(1, 2), (3, 4)],
            )?,
            Tier::new("quantity", r"(\d+)\s*(?:x|\*)?\s*([a-zA-Z\s]+)", &[(1, 2)])?,
            Tier::new(
                "worded",
                r"\b(ek|do|teen|char|panch|che|saat|aath|nau|das|one|two|three|four|five|six|seven|eight|nine|ten)\s+([a-zA-Z\s]+)",
                &[(1, 2)],
            )?,
            Tier::new(
                "phrasal",
                r"(?:i\s+want\s+(\d+)\s+of|give\s+me\s+(\d+))\s+([a-zA-Z\s]+)",
                &[(1, 3), (2, 3)],
            )?,
        ];

        Ok(Self {
            tiers,
            number_suffix: Regex::new(r"(\d+)\s*$")?,
            metric,
            fuzzy_threshold,
        })
    }

    /// Extract lines from `text`, labels canonicalized against `catalog`
    pub fn extract(&self, text: &str, catalog: &CatalogIndex) -> Vec<ExtractedLine> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Vec::new();
        }

        let lines = self.extract_tiers(&text, catalog);
        if !lines.is_empty() {
            tracing::debug!(count = lines.len(), "Extracted lines from quantity patterns");
            return lines;
        }

        if let Some(lines) = fallback::fixed_phrase(&text) {
            return lines;
        }

        let lines = fallback::scan_aliases(&text, catalog, &self.number_suffix);
        tracing::debug!(count = lines.len(), "Extracted lines from alias scan");
        lines
    }

    fn extract_tiers(&self, text: &str, catalog: &CatalogIndex) -> Vec<ExtractedLine> {
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut lines = LineSet::default();

        for tier in &self.tiers {
            for caps in tier.pattern.captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let span = whole.range();
                if overlaps(&claimed, &span) {
                    continue;
                }
                claimed.push(span);

                for &(qty_group, label_group) in tier.groups {
                    let Some(quantity) = read_quantity(&caps, qty_group) else {
                        continue;
                    };
                    let Some(raw) = caps.get(label_group) else {
                        continue;
                    };
                    let label = clean_label(raw.as_str(), catalog, self.metric, self.fuzzy_threshold);
                    if label.is_empty() || quantity == 0 {
                        continue;
                    }
                    tracing::trace!(tier = tier.name, %label, quantity, "Pattern line");
                    lines.add(&label, quantity);
                }
            }
        }

        lines.into_lines()
    }
}

/// Digits or a number word; `None` on overflow or when the group didn't take part
fn read_quantity(caps: &Captures<'_>, group: usize) -> Option<u32> {
    word_to_number(caps.get(group)?.as_str())
}
