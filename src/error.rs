use thiserror::Error;

/// Everything that can go wrong between receiving a payload and returning
/// generated text. The orchestrator reports exactly one of these per request.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    ClientInput(String),

    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    #[error("no index has been built for session '{0}'")]
    IndexNotFound(String),

    #[error("vector index for session '{0}' has no entries")]
    EmptyIndex(String),

    #[error("classification service error: {0}")]
    ClassificationService(String),

    #[error("generation service error: {0}")]
    GenerationService(String),

    #[error("vector store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RagError>;

impl From<sled::Error> for RagError {
    fn from(e: sled::Error) -> Self {
        RagError::Store(e.to_string())
    }
}
