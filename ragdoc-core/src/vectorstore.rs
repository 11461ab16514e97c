//! Vector store trait for storing and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{IndexedChunk, RetrievalResult};
use crate::error::Result;

/// A storage backend for embedded chunks with nearest-neighbor search.
///
/// One handle is created per process and shared; backends serialize their
/// own operations, the pipeline adds no locking of its own. Persisted
/// locally or behind a remote endpoint — callers are agnostic to which.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc_core::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.upsert(&records).await?;
/// let results = store.query(&query_embedding, 4).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Write records. An existing record with the same id is replaced.
    async fn upsert(&self, records: &[IndexedChunk]) -> Result<()>;

    /// Return the `top_k` records nearest to `embedding`, ordered by
    /// descending similarity score.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievalResult>>;

    /// Remove all records for one source, or every record when `source_id`
    /// is `None`.
    async fn clear(&self, source_id: Option<&str>) -> Result<()>;

    /// Number of records currently stored.
    async fn count(&self) -> Result<usize>;
}
