//! Zero-shot intent classification against an HTTP inference endpoint
//!
//! The endpoint takes `{inputs, parameters: {candidate_labels}}` and answers
//! `{labels, scores}` sorted by score, the shape served by common NLI
//! zero-shot pipelines.

use async_trait::async_trait;
use order_engine_core::{Classification, Classifier, ClassifierSource, Intent};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{Result, TextProcessingError};

/// Candidate labels and the intent each one stands for
pub const CANDIDATE_LABELS: &[(&str, Intent)] = &[
    ("place food order", Intent::PlaceOrder),
    ("track order status", Intent::TrackOrder),
    ("get branch information", Intent::BranchInfo),
    ("request help", Intent::Help),
    ("greeting message", Intent::Greeting),
    ("nearby restaurants", Intent::NearbyRestaurants),
    ("get menu", Intent::GetMenu),
];

pub fn intent_for_label(label: &str) -> Option<Intent> {
    CANDIDATE_LABELS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, intent)| *intent)
}

/// Scores returned by a backend, one per label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotScores {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl ZeroShotScores {
    /// Highest scoring label, whatever order the backend used
    pub fn top(&self) -> Option<(&str, f32)> {
        self.labels
            .iter()
            .zip(self.scores.iter().copied())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, score)| (label.as_str(), score))
    }
}

/// Something that can score text against candidate labels
#[async_trait]
pub trait ZeroShotBackend: Send + Sync + 'static {
    async fn score(&self, text: &str, labels: &[&str]) -> Result<ZeroShotScores>;
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// Backend that POSTs to an inference endpoint
pub struct HttpZeroShotBackend {
    client: Client,
    endpoint: String,
}

impl HttpZeroShotBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ZeroShotBackend for HttpZeroShotBackend {
    async fn score(&self, text: &str, labels: &[&str]) -> Result<ZeroShotScores> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TextProcessingError::Backend(format!(
                "Zero-shot endpoint returned {}: {}",
                status, body
            )));
        }

        let scores: ZeroShotScores = response
            .json()
            .await
            .map_err(|e| TextProcessingError::InvalidResponse(e.to_string()))?;

        if scores.labels.len() != scores.scores.len() {
            return Err(TextProcessingError::InvalidResponse(format!(
                "{} labels but {} scores",
                scores.labels.len(),
                scores.scores.len()
            )));
        }

        Ok(scores)
    }
}

/// Classifier over a zero-shot backend.
///
/// Reports the top label's score as confidence; callers apply the threshold.
pub struct ZeroShotClassifier {
    backend: Arc<dyn ZeroShotBackend>,
}

impl ZeroShotClassifier {
    pub fn new(backend: Arc<dyn ZeroShotBackend>) -> Self {
        Self { backend }
    }

    pub async fn predict(&self, text: &str) -> Result<Classification> {
        let labels: Vec<&str> = CANDIDATE_LABELS.iter().map(|(l, _)| *l).collect();
        let scores = self.backend.score(text, &labels).await?;

        let (label, score) = scores
            .top()
            .ok_or_else(|| TextProcessingError::InvalidResponse("no labels".to_string()))?;
        let intent = intent_for_label(label).ok_or_else(|| {
            TextProcessingError::InvalidResponse(format!("unknown label '{}'", label))
        })?;

        Ok(Classification::new(intent, score, ClassifierSource::ZeroShot))
    }
}

#[async_trait]
impl Classifier for ZeroShotClassifier {
    async fn classify(&self, text: &str) -> order_engine_core::Result<Classification> {
        Ok(self.predict(text).await?)
    }

    fn name(&self) -> &str {
        "zero_shot"
    }
}
