//! Intent classification
//!
//! A zero-shot model is consulted first when one is configured. Its answer is
//! used only above the confidence threshold; low confidence, a timeout or any
//! backend failure falls through to the keyword cascade, which always answers.
//!
//! # Example
//!
//! ```
//! use order_engine_core::Intent;
//! use order_engine_text_processing::intent::RuleBasedClassifier;
//!
//! let result = RuleBasedClassifier::new().detect("show me the menu");
//! assert_eq!(result.intent, Intent::GetMenu);
//! ```

mod rules;
mod zero_shot;

pub use rules::{
    default_rules, IntentRule, RuleBasedClassifier, RULE_DEFAULT_CONFIDENCE, RULE_MATCH_CONFIDENCE,
};
pub use zero_shot::{
    intent_for_label, HttpZeroShotBackend, ZeroShotBackend, ZeroShotClassifier, ZeroShotScores,
    CANDIDATE_LABELS,
};

use async_trait::async_trait;
use order_engine_core::{Classification, Classifier};
use std::sync::Arc;
use std::time::Duration;

/// Zero-shot first, rules as the guaranteed path
pub struct IntentClassifier {
    rules: RuleBasedClassifier,
    zero_shot: Option<Arc<dyn Classifier>>,
    threshold: f32,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(
        rules: RuleBasedClassifier,
        zero_shot: Option<Arc<dyn Classifier>>,
        threshold: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            rules,
            zero_shot,
            threshold,
            timeout,
        }
    }

    /// Keyword cascade only
    pub fn rules_only() -> Self {
        Self::new(RuleBasedClassifier::new(), None, 0.5, Duration::from_millis(2000))
    }

    pub fn has_zero_shot(&self) -> bool {
        self.zero_shot.is_some()
    }

    /// Classify; never fails
    pub async fn detect(&self, text: &str) -> Classification {
        if let Some(model) = &self.zero_shot {
            match tokio::time::timeout(self.timeout, model.classify(text)).await {
                Ok(Ok(result)) if result.confidence > self.threshold => {
                    tracing::debug!(
                        intent = %result.intent,
                        confidence = result.confidence,
                        "Zero-shot classification accepted"
                    );
                    return result;
                },
                Ok(Ok(result)) => {
                    tracing::debug!(
                        intent = %result.intent,
                        confidence = result.confidence,
                        threshold = self.threshold,
                        "Zero-shot confidence too low, using rules"
                    );
                },
                Ok(Err(e)) => {
                    tracing::warn!(classifier = model.name(), error = %e, "Zero-shot failed, using rules");
                },
                Err(_) => {
                    tracing::warn!(
                        classifier = model.name(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Zero-shot timed out, using rules"
                    );
                },
            }
        }

        self.rules.detect(text)
    }
}

#[async_trait]
impl Classifier for IntentClassifier {
    async fn classify(&self, text: &str) -> order_engine_core::Result<Classification> {
        Ok(self.detect(text).await)
    }

    fn name(&self) -> &str {
        "intent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_engine_core::{ClassifierSource, Error, Intent};

    struct Scripted {
        result: Option<Classification>,
        delay: Duration,
    }

    #[async_trait]
    impl Classifier for Scripted {
        async fn classify(&self, _text: &str) -> order_engine_core::Result<Classification> {
            tokio::time::sleep(self.delay).await;
            self.result
                .ok_or_else(|| Error::Classifier("endpoint down".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn with_model(result: Option<Classification>, delay_ms: u64) -> IntentClassifier {
        IntentClassifier::new(
            RuleBasedClassifier::new(),
            Some(Arc::new(Scripted {
                result,
                delay: Duration::from_millis(delay_ms),
            })),
            0.5,
            Duration::from_millis(50),
        )
    }

    fn zero_shot(intent: Intent, confidence: f32) -> Option<Classification> {
        Some(Classification::new(intent, confidence, ClassifierSource::ZeroShot))
    }

    #[tokio::test]
    async fn test_confident_model_wins() {
        let classifier = with_model(zero_shot(Intent::TrackOrder, 0.9), 0);
        let result = classifier.detect("hello").await;
        assert_eq!(result.intent, Intent::TrackOrder);
        assert_eq!(result.source, ClassifierSource::ZeroShot);
    }

    #[tokio::test]
    async fn test_low_confidence_falls_back() {
        let classifier = with_model(zero_shot(Intent::TrackOrder, 0.5), 0);
        let result = classifier.detect("hello").await;
        assert_eq!(result.intent, Intent::Greeting);
        assert_eq!(result.source, ClassifierSource::Rules);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let classifier = with_model(None, 0);
        assert_eq!(classifier.detect("menu please").await.intent, Intent::GetMenu);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let classifier = with_model(zero_shot(Intent::Help, 0.99), 500);
        let result = classifier.detect("hello").await;
        assert_eq!(result.source, ClassifierSource::Rules);
    }

    #[tokio::test]
    async fn test_rules_only() {
        let classifier = IntentClassifier::rules_only();
        assert!(!classifier.has_zero_shot());
        assert_eq!(classifier.detect("random words").await.intent, Intent::PlaceOrder);
    }
}
