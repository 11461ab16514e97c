//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of ingested source text.
///
/// Documents are created at ingestion and immutable thereafter; reflecting
/// changes to a source requires removing it and re-ingesting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable identifier for the source, e.g. the file name.
    pub source_id: String,
    /// Full extracted text.
    pub text: String,
    /// Optional source metadata (path, size, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into(), metadata: HashMap::new() }
    }
}

/// A contiguous substring of a [`Document`], the atomic retrieval unit.
///
/// Produced by a [`Chunker`](crate::chunking::Chunker); immutable. The
/// content is at most `chunk_size` characters and adjacent chunks from the
/// same document overlap by exactly `chunk_overlap` characters except at
/// document boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The chunk text.
    pub content: String,
    /// Starting character offset into the source text.
    pub start_offset: usize,
    /// Position of this chunk in the document's chunk sequence.
    pub sequence: usize,
    /// Identifier of the owning document (lookup only, not ownership).
    pub source_id: String,
}

/// A [`Chunk`] plus its embedding and the record id under which it is stored.
///
/// The structured payload written to the vector store: no free-form metadata
/// maps, every field is typed. Owned by the store once written; the indexer
/// never mutates a record after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedChunk {
    /// Unique record identifier, minted when the record is written.
    pub id: String,
    /// The chunk text.
    pub content: String,
    /// Identifier of the owning document.
    pub source_id: String,
    /// Starting character offset into the source text.
    pub start_offset: usize,
    /// Embedding vector. Stores may omit it on read-back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    /// Build a record from a chunk and its embedding, minting a fresh id.
    ///
    /// Re-indexing an identical chunk therefore produces a duplicate record;
    /// clearing the store is the supported reset path.
    pub fn new(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: chunk.content.clone(),
            source_id: chunk.source_id.clone(),
            start_offset: chunk.start_offset,
            embedding,
        }
    }
}

/// An [`IndexedChunk`] paired with a similarity score for one query.
///
/// Transient: produced per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The retrieved record.
    pub record: IndexedChunk,
    /// Similarity score, higher is more relevant.
    pub score: f32,
}
