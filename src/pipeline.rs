use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::embeddings::EmbeddingService;
use crate::error::{RagError, Result};
use crate::generate::AnswerGenerator;
use crate::intent::{GeminiIntentRouter, IntentClassifier, Mode};
use crate::vector_store::{IndexEntry, VectorStore};
use crate::{chunker, ingest};

/// Returned as a normal answer when a question arrives before any document
/// has been indexed for the session.
pub const NO_INDEX_GUIDANCE: &str = "Please upload and process PDFs first.";

const MISSING_INPUT_MESSAGE: &str = "Please provide both PDF and query";

/// Sequences one request end to end: decode, chunk, embed, build, retrieve,
/// classify, generate. Each stage either advances or fails the request;
/// there is no retry and no rollback of an already-persisted index.
pub struct Pipeline {
    settings: Settings,
    store: VectorStore,
    embedder: EmbeddingService,
    classifier: Box<dyn IntentClassifier>,
    generator: AnswerGenerator,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let store = VectorStore::open(&settings.data_dir)?;
        let embedder = EmbeddingService::new(
            &settings.api_base,
            &settings.api_key,
            &settings.embed_model,
            settings.request_timeout,
        )?;
        let classifier = GeminiIntentRouter::new(
            &settings.api_base,
            &settings.api_key,
            &settings.intent_model,
            settings.request_timeout,
        )?;
        let generator = AnswerGenerator::new(
            &settings.api_base,
            &settings.api_key,
            &settings.answer_model,
            settings.request_timeout,
        )?;

        Ok(Self {
            settings,
            store,
            embedder,
            classifier: Box::new(classifier),
            generator,
        })
    }

    /// Swap the intent classifier. The default free-text heuristic lives
    /// behind [`IntentClassifier`] precisely so it can be replaced.
    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// One end-to-end request: build a fresh index for `session` from the
    /// payload, then answer the query against it. Mirrors the single
    /// upload-and-ask call the transport layer exposes.
    pub async fn process_document(
        &self,
        session: &str,
        pdf_base64: &str,
        query: &str,
    ) -> Result<String> {
        if pdf_base64.trim().is_empty() || query.trim().is_empty() {
            return Err(RagError::ClientInput(MISSING_INPUT_MESSAGE.to_string()));
        }

        self.ingest(session, pdf_base64).await?;
        self.answer(session, query).await
    }

    /// Decode, chunk, embed and persist a document's index for `session`,
    /// replacing any previous index for the same session. Returns the chunk
    /// count. A later stage failing does not remove the persisted index.
    pub async fn ingest(&self, session: &str, pdf_base64: &str) -> Result<usize> {
        debug!(session, "Ingesting document");
        let raw_text = ingest::decode_pdf(pdf_base64)?;

        let chunks = chunker::split(
            &raw_text,
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        )?;
        debug!(session, chunks = chunks.len(), "Chunked document text");

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (content, embedding))| IndexEntry::new(i, content, embedding))
            .collect();

        self.store.build(session, &entries)?;
        info!(session, entries = entries.len(), "Indexed document");
        Ok(entries.len())
    }

    /// Answer a question against the session's persisted index: retrieve,
    /// classify, generate. A session with no index yet resolves to the
    /// guidance string rather than an error.
    pub async fn answer(&self, session: &str, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(RagError::ClientInput(MISSING_INPUT_MESSAGE.to_string()));
        }

        if !self.store.is_built(session) {
            info!(session, "Question asked before any document was processed");
            return Ok(NO_INDEX_GUIDANCE.to_string());
        }

        debug!(session, "Retrieving context");
        let query_embedding = self.embedder.embed_query(query).await?;
        let retrieved = self
            .store
            .search(session, &query_embedding, self.settings.top_k)?;

        // Classification failure degrades to a plain answer; "none of the
        // above" is a valid classifier outcome, so a dead classifier is
        // treated the same way.
        let mode = match self.classifier.classify(query).await {
            Ok(mode) => mode,
            Err(e) => {
                warn!(session, error = %e, "Intent classification failed, defaulting to Answer");
                Mode::Answer
            }
        };

        let context = retrieved
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let response = self.generator.generate(mode, &context, query).await?;
        info!(session, ?mode, response_chars = response.len(), "Generated response");
        Ok(response)
    }
}

/// The `{"response"}` / `{"error"}` envelope the transport layer serializes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success { response: String },
    Failure { error: String },
}

impl From<Result<String>> for ApiResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(response) => ApiResponse::Success { response },
            Err(e) => ApiResponse::Failure {
                error: e.to_string(),
            },
        }
    }
}
