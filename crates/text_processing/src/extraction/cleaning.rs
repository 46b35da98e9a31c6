//! Label cleaning: stop-word removal and canonicalization against the catalog

use order_engine_core::CatalogIndex;

use crate::matching::SimilarityMetric;

/// Single-word stop-words dropped from labels
pub const STOP_WORDS: &[&str] = &[
    "and", "with", "want", "order", "i", "to", "please", "for", "me", "give", "get", "need", "a",
    "an", "the", "some", "any", "of",
];

/// Multi-word stop phrases, matched as whole token runs
pub const STOP_PHRASES: &[&[&str]] = &[
    &["would", "like"],
    &["can", "i", "have"],
    &["may", "i", "have"],
];

/// Drop stop-words and stop phrases, keeping the remaining words in order
pub fn strip_stop_words(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let mut kept = Vec::with_capacity(tokens.len());
    let mut i = 0;

    'outer: while i < tokens.len() {
        for phrase in STOP_PHRASES {
            if tokens[i..].starts_with(phrase) {
                i += phrase.len();
                continue 'outer;
            }
        }
        if !STOP_WORDS.contains(&tokens[i]) {
            kept.push(tokens[i]);
        }
        i += 1;
    }

    kept.join(" ")
}

/// Clean a raw label and snap it to a catalog name when one is close enough.
///
/// Order: exact name, alias, best fuzzy similarity above `threshold` (no
/// popularity boost). Otherwise the cleaned text itself. Always lowercase;
/// empty when nothing but stop-words remained.
pub fn clean_label(
    raw: &str,
    catalog: &CatalogIndex,
    metric: SimilarityMetric,
    threshold: f64,
) -> String {
    let cleaned = strip_stop_words(raw);
    if cleaned.is_empty() {
        return cleaned;
    }

    if let Some(item) = catalog.find_by_name(&cleaned) {
        return item.name.to_lowercase();
    }

    if let Some(item) = catalog.lookup_alias(&cleaned) {
        return item.name.to_lowercase();
    }

    let mut best: Option<&str> = None;
    let mut best_score = threshold;
    for item in catalog.available() {
        let score = metric.score(&cleaned, &item.name.to_lowercase());
        if score > best_score {
            best_score = score;
            best = Some(&item.name);
        }
    }

    match best {
        Some(name) => name.to_lowercase(),
        None => cleaned,
    }
}
