//! Intent classification interface

use crate::{Classification, Result};
use async_trait::async_trait;

/// Maps message text to an intent
///
/// Implementations:
/// - `RuleBasedClassifier` - keyword cascade, never fails
/// - `ZeroShotClassifier` - statistical model behind an HTTP endpoint
///
/// # Example
///
/// ```ignore
/// let classifier: Arc<dyn Classifier> = Arc::new(RuleBasedClassifier::new());
/// let result = classifier.classify("show me the menu").await?;
/// assert_eq!(result.intent, Intent::GetMenu);
/// ```
#[async_trait]
pub trait Classifier: Send + Sync + 'static {
    /// Classify one message
    async fn classify(&self, text: &str) -> Result<Classification>;

    /// Name for logging
    fn name(&self) -> &str;
}
