//! Question-answering pipeline orchestrator.
//!
//! The [`RagPipeline`] composes a [`Chunker`], an [`EmbeddingProvider`], a
//! [`VectorStore`], and a [`LanguageModel`] into the full ingest-and-answer
//! workflow. It is the composition root: collaborators are constructed once
//! at process start and injected here, never looked up from global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragdoc_core::{RagConfig, RagPipeline, RecursiveChunker, InMemoryVectorStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .chunker(Arc::new(RecursiveChunker::new(2000, 500)?))
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .language_model(Arc::new(model))
//!     .build()?;
//!
//! pipeline.index_documents(&documents).await?;
//! let outcome = pipeline.process_question("what is the sky?", 4, 0.7).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document, IndexedChunk, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::model::LanguageModel;
use crate::vectorstore::VectorStore;

/// Returned when no retrieved chunk passes the similarity threshold.
/// The language model is never called in that case.
pub const NO_CONTEXT_ANSWER: &str =
    "I could not find relevant information in the knowledge base to answer your question.";

/// Separates chunk contents inside the assembled context block.
const CONTEXT_DELIMITER: &str = "\n\n----\n\n";

fn render_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the user's question:\n{question}\n\nusing the information below:\n\n{context}\n\n\
         If the information provided is not sufficient to answer the question, \
         state clearly that the knowledge base does not contain enough information."
    )
}

/// Counts reported after indexing a batch of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    /// Documents processed.
    pub documents: usize,
    /// Chunk records written to the vector store.
    pub chunks: usize,
}

/// One question's answer together with the retrieval results that backed
/// it, in descending score order, for the caller to present as citations.
#[derive(Debug, Clone)]
pub struct QuestionOutcome {
    /// The generated (or fallback) answer.
    pub answer: String,
    /// The retrieval results the answer was built from.
    pub results: Vec<RetrievalResult>,
}

/// The question-answering pipeline orchestrator.
///
/// Coordinates ingestion (chunk → embed → store) and question answering
/// (embed → search → filter → prompt → complete). Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    language_model: Arc<dyn LanguageModel>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Return a reference to the language model.
    pub fn language_model(&self) -> &Arc<dyn LanguageModel> {
        &self.language_model
    }

    /// Split a document into chunks using the configured chunker.
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        self.chunker.split(document)
    }

    /// Index a batch of chunks: embed each one and write it to the store.
    ///
    /// Returns the number of records written. Chunks are embedded one at a
    /// time; on failure the error reports exactly how many records were
    /// written before it, and nothing already written is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingUnavailable`] when the embedding
    /// provider fails; vector store errors propagate unchanged.
    pub async fn index_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        let mut written = 0usize;
        for chunk in chunks {
            let embedding = self.embedding_provider.embed(&chunk.content).await.map_err(|e| {
                error!(
                    source_id = %chunk.source_id,
                    sequence = chunk.sequence,
                    error = %e,
                    "embedding failed during indexing"
                );
                RagError::EmbeddingUnavailable { indexed: written, source: Box::new(e) }
            })?;

            let record = IndexedChunk::new(chunk, embedding);
            self.vector_store.upsert(std::slice::from_ref(&record)).await?;
            written += 1;
        }

        debug!(written, "indexed chunk batch");
        Ok(written)
    }

    /// Index one document: chunk it, then embed and store every chunk.
    ///
    /// Returns the number of records written. An empty document writes
    /// nothing and is not an error.
    pub async fn index_document(&self, document: &Document) -> Result<usize> {
        let chunks = self.chunker.split(document);
        let written = self.index_chunks(&chunks).await?;
        info!(source_id = %document.source_id, chunks = written, "indexed document");
        Ok(written)
    }

    /// Index a batch of documents.
    ///
    /// Re-indexing identical content produces duplicate records; clearing
    /// the store first is the supported reset path.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingUnavailable`] on the first embedding
    /// failure, with `indexed` counting records written across the whole
    /// batch up to that point.
    pub async fn index_documents(&self, documents: &[Document]) -> Result<IndexReport> {
        let mut chunks_written = 0usize;
        for document in documents {
            let chunks = self.chunker.split(document);
            let written = self.index_chunks(&chunks).await.map_err(|e| match e {
                RagError::EmbeddingUnavailable { indexed, source } => {
                    RagError::EmbeddingUnavailable { indexed: chunks_written + indexed, source }
                }
                other => other,
            })?;
            chunks_written += written;
        }

        info!(documents = documents.len(), chunks = chunks_written, "indexed document batch");
        Ok(IndexReport { documents: documents.len(), chunks: chunks_written })
    }

    /// Retrieve the chunks most similar to `query`.
    ///
    /// Asks the store for the `top_k` nearest records, drops every result
    /// scoring strictly below `threshold`, and returns the remainder in
    /// descending score order, preserving the store's tie-break order for
    /// equal scores. An empty store, or no record within range, yields an
    /// empty sequence, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] for `top_k == 0` or a
    /// threshold outside `[0, 1]`; collaborator failures surface as
    /// [`RagError::RetrievalUnavailable`].
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<RetrievalResult>> {
        if top_k == 0 {
            return Err(RagError::InvalidConfiguration("top_k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RagError::InvalidConfiguration(format!(
                "threshold ({threshold}) must be within [0, 1]"
            )));
        }

        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::RetrievalUnavailable { source: Box::new(e) }
        })?;

        let mut results =
            self.vector_store.query(&query_embedding, top_k).await.map_err(|e| {
                error!(error = %e, "vector store query failed");
                RagError::RetrievalUnavailable { source: Box::new(e) }
            })?;

        results.retain(|r| r.score >= threshold);
        // Stable sort keeps the store's tie-break order for equal scores.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        debug!(count = results.len(), top_k, threshold, "retrieval completed");
        Ok(results)
    }

    /// Generate an answer for `query` from already-retrieved results.
    ///
    /// With no results, returns [`NO_CONTEXT_ANSWER`] without calling the
    /// language model. Otherwise the chunk contents are joined in the given
    /// order into a single context block, the prompt template is rendered,
    /// and the model's output is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationUnavailable`] when the language model
    /// fails; no partial answer is fabricated.
    pub async fn answer(&self, query: &str, results: &[RetrievalResult]) -> Result<String> {
        if results.is_empty() {
            info!("no chunk passed the threshold, returning fallback answer");
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let context = results
            .iter()
            .map(|r| r.record.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_DELIMITER);
        let prompt = render_prompt(query, &context);

        self.language_model.complete(&prompt).await.map_err(|e| {
            error!(model = self.language_model.name(), error = %e, "completion failed");
            RagError::GenerationUnavailable { source: Box::new(e) }
        })
    }

    /// Answer a question end to end: retrieve, then generate.
    ///
    /// Returns the answer together with the retrieval results so the
    /// caller can present citations alongside it.
    pub async fn process_question(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<QuestionOutcome> {
        let results = self.retrieve(query, top_k, threshold).await?;
        let answer = self.answer(query, &results).await?;
        Ok(QuestionOutcome { answer, results })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    language_model: Option<Arc<dyn LanguageModel>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the language model used for answer generation.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Build the [`RagPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if any field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self
            .config
            .ok_or_else(|| RagError::InvalidConfiguration("config is required".to_string()))?;
        let chunker = self
            .chunker
            .ok_or_else(|| RagError::InvalidConfiguration("chunker is required".to_string()))?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let vector_store = self.vector_store.ok_or_else(|| {
            RagError::InvalidConfiguration("vector_store is required".to_string())
        })?;
        let language_model = self.language_model.ok_or_else(|| {
            RagError::InvalidConfiguration("language_model is required".to_string())
        })?;

        Ok(RagPipeline { config, chunker, embedding_provider, vector_store, language_model })
    }
}
