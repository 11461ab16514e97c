//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency store
//! backed by a `Vec` protected by a `tokio::sync::RwLock`. Suitable for
//! development, testing, and small corpora.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedChunk, RetrievalResult};
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// An in-memory vector store using cosine similarity for search.
///
/// Records are kept in insertion order, which doubles as the tie-break
/// order for equal scores. All operations are async-safe via
/// `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<Vec<IndexedChunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: &[IndexedChunk]) -> Result<()> {
        let mut stored = self.records.write().await;
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => stored.push(record.clone()),
            }
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievalResult>> {
        let stored = self.records.read().await;

        let mut scored: Vec<RetrievalResult> = stored
            .iter()
            .map(|record| RetrievalResult {
                score: cosine_similarity(&record.embedding, embedding),
                record: record.clone(),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn clear(&self, source_id: Option<&str>) -> Result<()> {
        let mut stored = self.records.write().await;
        match source_id {
            Some(source) => stored.retain(|r| r.source_id != source),
            None => stored.clear(),
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}
