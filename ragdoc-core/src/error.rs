//! Error types for the `ragdoc-core` crate.

use thiserror::Error;

/// Errors that can occur in the question-answering pipeline.
///
/// Collaborator-level failures ([`Embedding`](RagError::Embedding),
/// [`Store`](RagError::Store), [`Model`](RagError::Model)) are raised by the
/// trait implementations; the pipeline wraps them into stage errors that
/// record which stage failed and, for indexing, how much progress was made.
#[derive(Debug, Error)]
pub enum RagError {
    /// Bad chunking or retrieval parameters supplied by the caller.
    /// Never worth retrying.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The embedding provider failed.
    #[error("embedding provider error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector store backend failed.
    #[error("vector store error ({backend}): {message}")]
    Store {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The language model failed.
    #[error("language model error ({model}): {message}")]
    Model {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// Indexing stopped because the embedding provider became unavailable.
    ///
    /// `indexed` reports how many chunks were written before the failure;
    /// records already written are not rolled back.
    #[error("embedding unavailable, {indexed} chunks indexed before failure")]
    EmbeddingUnavailable {
        /// Number of chunks successfully written before the failure.
        indexed: usize,
        /// The underlying collaborator error.
        #[source]
        source: Box<RagError>,
    },

    /// Retrieval failed in the query-embedding or vector-search step.
    #[error("retrieval unavailable")]
    RetrievalUnavailable {
        /// The underlying collaborator error.
        #[source]
        source: Box<RagError>,
    },

    /// Answer generation failed. No partial answer is fabricated.
    #[error("generation unavailable")]
    GenerationUnavailable {
        /// The underlying collaborator error.
        #[source]
        source: Box<RagError>,
    },

    /// A source directory or named file required for ingestion is absent.
    #[error("not found: {0}")]
    NotFound(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
