use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::gemini::GeminiClient;

/// The closed set of answer styles the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Answer,
    QualityRating,
    Summary,
    ReadabilityRating,
}

/// Classifies a free-form question into a [`Mode`]. Kept behind a trait so
/// the free-text heuristic below can later be swapped for a
/// structured-output classifier without touching the orchestrator.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, question: &str) -> Result<Mode>;
}

const CLASSIFIER_INSTRUCTION: &str = "\
Based on the user's prompt, decide which function to call. The available functions are:

1. Rate the quality of the paper.
2. Extract the most important points of the paper.
3. Rate the readability of the paper.

If none of the functions are suitable, respond with \"none\".";

/// Map the classifier model's free-text reply onto a mode.
///
/// The checks run in a fixed priority order; a reply mentioning both
/// "readability" and "quality" resolves to `ReadabilityRating` because that
/// check runs first. Anything unrecognized, including "none", falls through
/// to `Answer`.
pub fn resolve_mode(reply: &str) -> Mode {
    let lowered = reply.to_lowercase();
    if reply.contains('3') || lowered.contains("readability") {
        Mode::ReadabilityRating
    } else if reply.contains('2') || lowered.contains("important points") {
        Mode::Summary
    } else if reply.contains('1') || lowered.contains("quality") {
        Mode::QualityRating
    } else {
        Mode::Answer
    }
}

/// Gemini-backed intent classifier.
pub struct GeminiIntentRouter {
    client: GeminiClient,
    model: String,
}

impl GeminiIntentRouter {
    pub fn new(api_base: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = GeminiClient::new(api_base, api_key, timeout)
            .map_err(RagError::ClassificationService)?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl IntentClassifier for GeminiIntentRouter {
    async fn classify(&self, question: &str) -> Result<Mode> {
        let reply = self
            .client
            .generate(&self.model, Some(CLASSIFIER_INSTRUCTION), question, 0.3)
            .await
            .map_err(RagError::ClassificationService)?
            .unwrap_or_else(|| "Error: No valid response.".to_string());

        let mode = resolve_mode(&reply);
        debug!(reply = %reply.trim(), ?mode, "Classified question intent");
        Ok(mode)
    }
}
