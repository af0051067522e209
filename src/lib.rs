//! wren: retrieval-augmented Q&A over one uploaded PDF.
//!
//! The pipeline decodes a base64 PDF, splits its text into overlapping
//! chunks, embeds them, and persists a session-scoped vector index. A
//! question is then embedded, the nearest chunks retrieved, the question's
//! intent classified into one of four answer modes, and a mode-specific
//! prompt sent to the generative model.
//!
//! ```ignore
//! use wren::{Pipeline, Settings};
//!
//! let pipeline = Pipeline::new(Settings::from_env()?)?;
//! let answer = pipeline
//!     .process_document("session-1", &pdf_base64, "Summarize this paper")
//!     .await?;
//! ```

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod gemini;
pub mod generate;
pub mod ingest;
pub mod intent;
pub mod logging;
pub mod pipeline;
pub mod vector_store;

pub use config::Settings;
pub use error::{RagError, Result};
pub use intent::{IntentClassifier, Mode};
pub use pipeline::{ApiResponse, Pipeline, NO_INDEX_GUIDANCE};
pub use vector_store::{IndexEntry, ScoredChunk, VectorStore};
