use std::sync::Arc;

use anyhow::Context;
use ragdoc_core::chroma::ChromaVectorStore;
use ragdoc_core::openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
use ragdoc_core::{InMemoryVectorStore, RagConfig, RagPipeline, RecursiveChunker, VectorStore};
use ragdoc_server::config::{Settings, StoreBackend};
use ragdoc_server::{AppState, run_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let state = build_state(settings)?;
    run_server(state).await
}

/// Composition root: collaborators are constructed once here and injected
/// into the pipeline; nothing is looked up from global state afterwards.
fn build_state(settings: Settings) -> anyhow::Result<AppState> {
    let api_key = settings
        .openai_api_key
        .clone()
        .context("OPENAI_API_KEY is required to start the server")?;

    let embedder = Arc::new(
        OpenAIEmbeddingProvider::new(api_key.clone())?
            .with_model(settings.embedding_model.clone(), settings.embedding_dimensions),
    );
    let model =
        Arc::new(OpenAIChatModel::new(api_key)?.with_model(settings.openai_model.clone()));

    let store: Arc<dyn VectorStore> = match settings.store_backend {
        StoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
        StoreBackend::Chroma => Arc::new(ChromaVectorStore::new(
            settings.chroma_url.clone(),
            settings.chroma_collection.clone(),
        )),
    };

    let config = RagConfig::builder()
        .chunk_size(settings.chunk_size)
        .chunk_overlap(settings.chunk_overlap)
        .top_k(settings.top_k)
        .similarity_threshold(settings.similarity_threshold)
        .build()?;

    let pipeline = RagPipeline::builder()
        .config(config)
        .chunker(Arc::new(RecursiveChunker::new(settings.chunk_size, settings.chunk_overlap)?))
        .embedding_provider(embedder)
        .vector_store(store)
        .language_model(model)
        .build()?;

    Ok(AppState { pipeline: Arc::new(pipeline), settings: Arc::new(settings) })
}
