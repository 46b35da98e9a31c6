//! String similarity for fuzzy catalog matching
//!
//! Two metrics, both normalized to `0.0..=1.0`:
//! - `SequenceRatio`: Ratcliff/Obershelp matching blocks, `2 * M / T`
//! - `Levenshtein`: `1 - distance / max_len`

use serde::{Deserialize, Serialize};

/// Similarity metric used for fuzzy matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    SequenceRatio,
    Levenshtein,
}

impl SimilarityMetric {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sequence_ratio" => Some(Self::SequenceRatio),
            "levenshtein" => Some(Self::Levenshtein),
            _ => None,
        }
    }

    /// Score two strings
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::SequenceRatio => sequence_ratio(a, b),
            Self::Levenshtein => levenshtein_ratio(a, b),
        }
    }
}

/// Ratcliff/Obershelp similarity
///
/// Finds the longest common block, recurses on both sides of it, and scores
/// `2 * matched / (len(a) + len(b))`. Ties pick the block that ends first in
/// `a`, then in `b`.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_common_block(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// (start in a, start in b, length) of the longest common substring
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev_row = vec![0usize; b.len() + 1];
    let mut curr_row = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        for j in 0..b.len() {
            curr_row[j + 1] = if a[i] == b[j] { prev_row[j] + 1 } else { 0 };
            let k = curr_row[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    best
}

/// Levenshtein edit distance, case-insensitive
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    // Two rows instead of the full matrix
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row: Vec<usize> = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1].to_lowercase().next()
                == s2_chars[j - 1].to_lowercase().next()
            {
                0
            } else {
                1
            };

            curr_row[j] = std::cmp::min(
                std::cmp::min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Edit distance normalized by the longer string
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sequence_ratio_known_values() {
        // "abcd" / "bcde": one block "bcd" of 3 → 6/8
        assert!(close(sequence_ratio("abcd", "bcde"), 0.75));
        assert!(close(sequence_ratio("latte", "latte"), 1.0));
        assert!(close(sequence_ratio("abc", "xyz"), 0.0));
        assert!(close(sequence_ratio("", ""), 1.0));
    }

    #[test]
    fn test_sequence_ratio_recurses() {
        // every char of the shorter string matches: 9 of 9+10
        let r = sequence_ratio("capuccino", "cappuccino");
        assert!(close(r, 18.0 / 19.0), "{}", r);
        // "expresso" vs "espresso": "e", "presso" → 7 of 16
        assert!(close(sequence_ratio("expresso", "espresso"), 14.0 / 16.0));
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("Latte", "latte"), 0);
    }

    #[test]
    fn test_levenshtein_ratio() {
        assert!(close(levenshtein_ratio("sandwitch", "sandwich"), 1.0 - 1.0 / 9.0));
        assert!(close(levenshtein_ratio("", ""), 1.0));
    }

    #[test]
    fn test_metric_dispatch() {
        assert_eq!(SimilarityMetric::from_str("levenshtein"), Some(SimilarityMetric::Levenshtein));
        assert_eq!(SimilarityMetric::from_str("jaro"), None);
        assert!(close(SimilarityMetric::default().score("abcd", "bcde"), 0.75));
        assert!(close(SimilarityMetric::Levenshtein.score("abcd", "bcde"), 0.5));
    }
}
