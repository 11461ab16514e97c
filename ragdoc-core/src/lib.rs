//! # ragdoc-core
//!
//! Retrieval-augmented question answering over a corpus of ingested
//! documents: chunking, indexing, retrieval, and answer generation.
//!
//! The embedding model, the vector store, and the language model are
//! external collaborators behind the [`EmbeddingProvider`], [`VectorStore`],
//! and [`LanguageModel`] traits; [`RagPipeline`] composes them. Backends for
//! OpenAI and Chroma are feature-gated (`openai`, `chroma`);
//! [`InMemoryVectorStore`] is always available.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragdoc_core::{
//!     Document, InMemoryVectorStore, RagConfig, RagPipeline, RecursiveChunker,
//! };
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .chunker(Arc::new(RecursiveChunker::new(2000, 500)?))
//!     .embedding_provider(embedder)
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .language_model(model)
//!     .build()?;
//!
//! pipeline.index_document(&Document::new("notes.txt", "...")).await?;
//! let outcome = pipeline.process_question("what do the notes say?", 4, 0.7).await?;
//! println!("{}", outcome.answer);
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod model;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "chroma")]
pub mod chroma;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::RagConfig;
pub use document::{Chunk, Document, IndexedChunk, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use model::LanguageModel;
pub use pipeline::{IndexReport, QuestionOutcome, RagPipeline, RagPipelineBuilder, NO_CONTEXT_ANSWER};
pub use vectorstore::VectorStore;
