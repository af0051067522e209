use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use tracing::debug;

use crate::error::{RagError, Result};

/// One indexed chunk: its embedding plus the source text it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: i64,
}

impl IndexEntry {
    pub fn new(chunk_index: usize, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chunk_index,
            content,
            embedding,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub content: String,
    pub score: f32,
    pub chunk_index: usize,
}

/// Durable vector index. Each session key maps to its own sled tree, so
/// concurrent sessions never read each other's documents. Entries are keyed
/// by chunk index in big-endian form, which makes iteration order equal to
/// insertion order.
pub struct VectorStore {
    db: Db,
}

impl VectorStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RagError::Store(format!("failed to create data directory: {}", e)))?;
        }

        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Build the index for a session from scratch, replacing any previous
    /// index for the same session, and flush it to disk. Destructive by
    /// contract.
    pub fn build(&self, session: &str, entries: &[IndexEntry]) -> Result<()> {
        self.db.drop_tree(tree_name(session))?;
        let tree = self.db.open_tree(tree_name(session))?;

        for entry in entries {
            let key = (entry.chunk_index as u64).to_be_bytes();
            let value = bincode::serialize(entry)
                .map_err(|e| RagError::Store(format!("failed to serialize entry: {}", e)))?;
            tree.insert(key, value)?;
        }
        tree.flush()?;

        debug!(session, entries = entries.len(), "Built vector index");
        Ok(())
    }

    /// True when `build` has run for this session at least once.
    pub fn is_built(&self, session: &str) -> bool {
        self.db
            .tree_names()
            .iter()
            .any(|name| name.as_ref() == tree_name(session).as_bytes())
    }

    /// Return the `k` entries nearest to `query_embedding` by cosine
    /// similarity, in non-increasing similarity order. Ties keep insertion
    /// order. The session's tree is re-read on every call, so a search
    /// observes whatever the last `build` persisted.
    pub fn search(&self, session: &str, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let entries = self.load_entries(session)?;
        if entries.is_empty() {
            return Err(RagError::EmptyIndex(session.to_string()));
        }

        let mut results: Vec<ScoredChunk> = entries
            .into_iter()
            .map(|entry| ScoredChunk {
                score: cosine_similarity(query_embedding, &entry.embedding),
                content: entry.content,
                chunk_index: entry.chunk_index,
            })
            .collect();

        // Stable sort: equal scores keep ascending chunk order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    pub fn entry_count(&self, session: &str) -> Result<usize> {
        Ok(self.load_entries(session)?.len())
    }

    fn load_entries(&self, session: &str) -> Result<Vec<IndexEntry>> {
        if !self.is_built(session) {
            return Err(RagError::IndexNotFound(session.to_string()));
        }

        let tree = self.db.open_tree(tree_name(session))?;
        let mut entries = Vec::new();
        for item in tree.iter() {
            let (_, value) = item?;
            let entry: IndexEntry = bincode::deserialize(&value)
                .map_err(|e| RagError::Store(format!("failed to deserialize entry: {}", e)))?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

fn tree_name(session: &str) -> String {
    format!("session/{}", session)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let vec_a = DVector::from_vec(a.to_vec());
    let vec_b = DVector::from_vec(b.to_vec());

    let dot_product = vec_a.dot(&vec_b);
    let norm_a = vec_a.norm();
    let norm_b = vec_b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_store() -> (tempfile::TempDir, VectorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(&dir.path().join("index")).unwrap();
        (dir, store)
    }

    fn entry(i: usize, content: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry::new(i, content.to_string(), embedding)
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0, 3.0];
        let similarity = cosine_similarity(&a, &b);
        assert!((similarity - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        let similarity = cosine_similarity(&a, &b);
        assert!(similarity.abs() < 0.001);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let (_dir, store) = open_temp_store();
        store
            .build(
                "s1",
                &[
                    entry(0, "far", vec![0.0, 1.0]),
                    entry(1, "near", vec![1.0, 0.0]),
                    entry(2, "middle", vec![1.0, 1.0]),
                ],
            )
            .unwrap();

        let results = store.search("s1", &[1.0, 0.0], 3).unwrap();
        let contents: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["near", "middle", "far"]);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let (_dir, store) = open_temp_store();
        store
            .build(
                "s1",
                &[
                    entry(0, "first", vec![1.0, 0.0]),
                    entry(1, "second", vec![1.0, 0.0]),
                    entry(2, "third", vec![1.0, 0.0]),
                ],
            )
            .unwrap();

        let results = store.search("s1", &[1.0, 0.0], 3).unwrap();
        let order: Vec<usize> = results.iter().map(|r| r.chunk_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index");
        let query = [0.9, 0.1];

        let before = {
            let store = VectorStore::open(&path).unwrap();
            store
                .build(
                    "s1",
                    &[
                        entry(0, "alpha", vec![1.0, 0.0]),
                        entry(1, "beta", vec![0.0, 1.0]),
                    ],
                )
                .unwrap();
            store.search("s1", &query, 2).unwrap()
        };

        let store = VectorStore::open(&path).unwrap();
        let after = store.search("s1", &query, 2).unwrap();

        let contents = |results: &[ScoredChunk]| {
            results.iter().map(|r| r.content.clone()).collect::<Vec<_>>()
        };
        assert_eq!(contents(&before), contents(&after));
    }

    #[test]
    fn test_unbuilt_session_is_not_found() {
        let (_dir, store) = open_temp_store();
        let result = store.search("never-built", &[1.0], 4);
        assert!(matches!(result, Err(RagError::IndexNotFound(_))));
    }

    #[test]
    fn test_empty_index_is_an_error() {
        let (_dir, store) = open_temp_store();
        store.build("s1", &[]).unwrap();
        let result = store.search("s1", &[1.0], 4);
        assert!(matches!(result, Err(RagError::EmptyIndex(_))));
    }

    #[test]
    fn test_build_replaces_previous_index() {
        let (_dir, store) = open_temp_store();
        store
            .build("s1", &[entry(0, "old", vec![1.0, 0.0])])
            .unwrap();
        store
            .build("s1", &[entry(0, "new", vec![1.0, 0.0])])
            .unwrap();

        let results = store.search("s1", &[1.0, 0.0], 4).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "new");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let (_dir, store) = open_temp_store();
        store
            .build("a", &[entry(0, "doc a", vec![1.0, 0.0])])
            .unwrap();
        store
            .build("b", &[entry(0, "doc b", vec![1.0, 0.0])])
            .unwrap();

        let results = store.search("a", &[1.0, 0.0], 4).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "doc a");
    }
}
