use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RagError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 1_000;
pub const DEFAULT_TOP_K: usize = 4;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Runtime settings for the pipeline. The API key is read once at
/// construction; a missing key is a startup error, not a first-request error.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    /// Base URL of the Generative Language API. Overridable for tests.
    pub api_base: String,
    /// Embedding model used for both chunks and queries. Indexing and
    /// querying with different embedding models is a caller error the
    /// pipeline cannot detect; keep this fixed for the life of an index.
    pub embed_model: String,
    pub answer_model: String,
    pub intent_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    /// Directory holding the sled database (one tree per session).
    pub data_dir: PathBuf,
    /// Applied to every external-model call; these are the pipeline's only
    /// unbounded-latency points.
    pub request_timeout: Duration,
}

impl Settings {
    /// Load settings from the environment (`.env` honored via dotenvy).
    /// Requires `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| RagError::Config("GOOGLE_API_KEY is not set".to_string()))?;

        let data_dir = match std::env::var("WREN_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_data_dir()?,
        };

        let settings = Self {
            api_key,
            api_base: std::env::var("WREN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            embed_model: "models/embedding-001".to_string(),
            answer_model: "gemini-pro".to_string(),
            intent_model: "gemini-1.5-flash".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            data_dir,
            request_timeout: Duration::from_secs(60),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RagError::Config("API key is empty".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be non-zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .map_err(|_| RagError::Config("failed to get user home directory".to_string()))?;

    Ok(PathBuf::from(home_dir).join(".wren").join("index"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            embed_model: "models/embedding-001".to_string(),
            answer_model: "gemini-pro".to_string(),
            intent_model: "gemini-1.5-flash".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            data_dir: PathBuf::from("/tmp/wren-test"),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(base_settings().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut settings = base_settings();
        settings.chunk_overlap = settings.chunk_size;
        assert!(matches!(settings.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut settings = base_settings();
        settings.api_key = " ".to_string();
        assert!(matches!(settings.validate(), Err(RagError::Config(_))));
    }
}
