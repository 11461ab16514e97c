//! Chroma vector store backend.
//!
//! Provides [`ChromaVectorStore`] which implements [`VectorStore`] against
//! a Chroma server's REST API with `reqwest`. Only available when the
//! `chroma` feature is enabled.
//!
//! The collection is resolved (get-or-create, cosine space) on first use
//! and the id is cached for the life of the handle, so one store handle is
//! created per process and shared.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragdoc_core::chroma::ChromaVectorStore;
//!
//! let store = ChromaVectorStore::new("http://localhost:8000", "ragdoc");
//! store.upsert(&records).await?;
//! let results = store.query(&query_embedding, 4).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::document::{IndexedChunk, RetrievalResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Typed record metadata stored alongside each embedding.
#[derive(Debug, Serialize, Deserialize)]
struct RecordMetadata {
    source_id: String,
    start_offset: usize,
}

/// A [`VectorStore`] backed by a [Chroma](https://www.trychroma.com/) server.
///
/// Distances come back in cosine space; they are mapped to similarity
/// scores as `1 - distance` so thresholds compare the same way as with the
/// in-memory store.
pub struct ChromaVectorStore {
    client: reqwest::Client,
    base_url: String,
    collection_name: String,
    collection_id: OnceCell<String>,
}

impl ChromaVectorStore {
    /// Create a new store talking to `base_url` (e.g.
    /// `http://localhost:8000`), using the named collection.
    pub fn new(base_url: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection_name: collection_name.into(),
            collection_id: OnceCell::new(),
        }
    }

    fn map_err(e: reqwest::Error) -> RagError {
        RagError::Store { backend: "chroma".to_string(), message: e.to_string() }
    }

    fn api_error(status: reqwest::StatusCode, body: String) -> RagError {
        RagError::Store {
            backend: "chroma".to_string(),
            message: format!("API returned {status}: {body}"),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Self::api_error(status, body))
    }

    /// Resolve the collection id, creating the collection with cosine
    /// distance on first use.
    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                #[derive(Deserialize)]
                struct Collection {
                    id: String,
                }

                let response = self
                    .client
                    .post(format!("{}/api/v1/collections", self.base_url))
                    .json(&json!({
                        "name": self.collection_name,
                        "get_or_create": true,
                        "metadata": { "hnsw:space": "cosine" },
                    }))
                    .send()
                    .await
                    .map_err(Self::map_err)?;

                let collection: Collection =
                    Self::check(response).await?.json().await.map_err(Self::map_err)?;
                debug!(
                    collection = %self.collection_name,
                    id = %collection.id,
                    "resolved chroma collection"
                );
                Ok::<_, RagError>(collection.id)
            })
            .await?;
        Ok(id)
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<RecordMetadata>>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn upsert(&self, records: &[IndexedChunk]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let collection = self.collection_id().await?;

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let embeddings: Vec<&[f32]> = records.iter().map(|r| r.embedding.as_slice()).collect();
        let documents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        let metadatas: Vec<RecordMetadata> = records
            .iter()
            .map(|r| RecordMetadata {
                source_id: r.source_id.clone(),
                start_offset: r.start_offset,
            })
            .collect();

        let response = self
            .client
            .post(format!("{}/api/v1/collections/{collection}/upsert", self.base_url))
            .json(&json!({
                "ids": ids,
                "embeddings": embeddings,
                "documents": documents,
                "metadatas": metadatas,
            }))
            .send()
            .await
            .map_err(Self::map_err)?;
        Self::check(response).await?;

        debug!(count = records.len(), "upserted records to chroma");
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievalResult>> {
        let collection = self.collection_id().await?;

        let response = self
            .client
            .post(format!("{}/api/v1/collections/{collection}/query", self.base_url))
            .json(&json!({
                "query_embeddings": [embedding],
                "n_results": top_k,
                "include": ["documents", "metadatas", "distances"],
            }))
            .send()
            .await
            .map_err(Self::map_err)?;

        let parsed: QueryResponse =
            Self::check(response).await?.json().await.map_err(Self::map_err)?;

        let ids = parsed.ids.into_iter().next().unwrap_or_default();
        let mut documents = parsed.documents.into_iter().next().unwrap_or_default();
        let mut metadatas = parsed.metadatas.into_iter().next().unwrap_or_default();
        let mut distances = parsed.distances.into_iter().next().unwrap_or_default();
        documents.resize(ids.len(), None);
        metadatas.resize_with(ids.len(), || None);
        distances.resize(ids.len(), 2.0);

        let results = ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .zip(distances)
            .map(|(((id, content), metadata), distance)| {
                let (source_id, start_offset) = metadata
                    .map(|m| (m.source_id, m.start_offset))
                    .unwrap_or_default();
                RetrievalResult {
                    record: IndexedChunk {
                        id,
                        content: content.unwrap_or_default(),
                        source_id,
                        start_offset,
                        embedding: Vec::new(),
                    },
                    score: 1.0 - distance,
                }
            })
            .collect();

        Ok(results)
    }

    async fn clear(&self, source_id: Option<&str>) -> Result<()> {
        let collection = self.collection_id().await?;

        let body = match source_id {
            Some(source) => json!({ "where": { "source_id": source } }),
            None => json!({}),
        };

        let response = self
            .client
            .post(format!("{}/api/v1/collections/{collection}/delete", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(Self::map_err)?;
        Self::check(response).await?;

        debug!(source_id, "cleared chroma records");
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let collection = self.collection_id().await?;

        let response = self
            .client
            .get(format!("{}/api/v1/collections/{collection}/count", self.base_url))
            .send()
            .await
            .map_err(Self::map_err)?;

        Self::check(response).await?.json().await.map_err(Self::map_err)
    }
}
