//! Keyword cascade classifier

use async_trait::async_trait;
use order_engine_core::text::contains_any;
use order_engine_core::{Classification, Classifier, ClassifierSource, Intent};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Confidence reported when a keyword tier matched
pub const RULE_MATCH_CONFIDENCE: f32 = 0.8;
/// Confidence reported for the place-order default
pub const RULE_DEFAULT_CONFIDENCE: f32 = 0.3;

/// One tier of the cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    /// Whole-word phrases, lowercase
    pub keywords: Vec<String>,
}

impl IntentRule {
    pub fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        let keywords: Vec<&str> = self.keywords.iter().map(String::as_str).collect();
        contains_any(text, &keywords)
    }
}

/// Tiers in priority order
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule::new(
            Intent::NearbyRestaurants,
            &["nearby", "close to", "near me", "around me", "restaurants near"],
        ),
        IntentRule::new(
            Intent::PlaceOrder,
            &["order", "want", "need", "would like", "can i have", "give me", "i want"],
        ),
        IntentRule::new(
            Intent::TrackOrder,
            &["track", "status", "where is", "when will", "order status"],
        ),
        IntentRule::new(
            Intent::BranchInfo,
            &["branch", "shop", "location", "outlet", "address", "branches"],
        ),
        IntentRule::new(Intent::Help, &["help", "support", "problem", "issue"]),
        IntentRule::new(Intent::Greeting, &["hello", "hi", "hey", "start", "good"]),
        IntentRule::new(
            Intent::GetMenu,
            &["menu", "items", "list", "what do you have", "offer", "whats available"],
        ),
    ]
}

/// First matching tier wins; anything else is treated as an order attempt
pub struct RuleBasedClassifier {
    rules: RwLock<Vec<IntentRule>>,
}

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Replace the cascade
    pub fn set_rules(&self, rules: Vec<IntentRule>) {
        *self.rules.write() = rules;
    }

    pub fn detect(&self, text: &str) -> Classification {
        let text = text.to_lowercase();
        let rules = self.rules.read();

        match rules.iter().find(|rule| rule.matches(&text)) {
            Some(rule) => {
                Classification::new(rule.intent, RULE_MATCH_CONFIDENCE, ClassifierSource::Rules)
            },
            None => Classification::new(
                Intent::PlaceOrder,
                RULE_DEFAULT_CONFIDENCE,
                ClassifierSource::Rules,
            ),
        }
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for RuleBasedClassifier {
    async fn classify(&self, text: &str) -> order_engine_core::Result<Classification> {
        Ok(self.detect(text))
    }

    fn name(&self) -> &str {
        "rules"
    }
}
