use std::time::Duration;

use crate::error::{RagError, Result};
use crate::gemini::GeminiClient;

/// Embeds chunk batches at index time and single queries at search time.
///
/// Precondition: one `EmbeddingService` (and therefore one model) is used
/// for both sides of an index's lifetime. Vectors from different models do
/// not share a metric space, and nothing downstream can detect the mix-up.
pub struct EmbeddingService {
    client: GeminiClient,
    model: String,
}

impl EmbeddingService {
    pub fn new(api_base: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client =
            GeminiClient::new(api_base, api_key, timeout).map_err(RagError::EmbeddingService)?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client
            .embed_batch(&self.model, texts)
            .await
            .map_err(RagError::EmbeddingService)
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed_single(&self.model, text)
            .await
            .map_err(RagError::EmbeddingService)
    }
}
