//! Text understanding for the order engine
//!
//! - **Intent**: keyword cascade plus an optional zero-shot model
//! - **Extraction**: `{label, quantity}` lines from free text
//! - **Matching**: labels resolved to catalog items
//!
//! # Example
//!
//! ```ignore
//! use order_engine_text_processing::{ItemExtractor, MenuMatcher, SimilarityMetric};
//!
//! let extractor = ItemExtractor::new(SimilarityMetric::SequenceRatio, 0.6)?;
//! let lines = extractor.extract("2 cappuccino 1 cookie", &catalog);
//! let report = MenuMatcher::default().validate(&lines, &catalog);
//! println!("Total: {}", report.total_amount());
//! ```

pub mod extraction;
pub mod intent;
pub mod matching;
pub mod numbers;

mod error;

pub use error::{Result, TextProcessingError};

pub use extraction::ItemExtractor;
pub use intent::{
    HttpZeroShotBackend, IntentClassifier, IntentRule, RuleBasedClassifier, ZeroShotBackend,
    ZeroShotClassifier, ZeroShotScores,
};
pub use matching::{MatchStep, MatcherConfig, MenuMatch, MenuMatcher, SimilarityMetric, ValidationReport};
pub use numbers::word_to_number;
