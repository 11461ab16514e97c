//! HTTP contract tests against a server bound to an ephemeral port, with
//! deterministic mock collaborators in place of OpenAI and Chroma.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragdoc_core::{
    EmbeddingProvider, InMemoryVectorStore, LanguageModel, NO_CONTEXT_ANSWER, RagConfig,
    RagPipeline, RecursiveChunker, Result as RagResult,
};
use ragdoc_server::config::{Settings, StoreBackend};
use ragdoc_server::{AppState, app_router};
use serde_json::{Value, json};
use tempfile::TempDir;

const VOCAB: &[&str] = &["sky", "grass", "blue", "green", "color", "what"];

struct VocabEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for VocabEmbeddingProvider {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut embedding: Vec<f32> =
            VOCAB.iter().map(|word| if lower.contains(word) { 1.0 } else { 0.0 }).collect();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        VOCAB.len()
    }
}

#[derive(Default)]
struct CountingModel {
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for CountingModel {
    async fn complete(&self, _prompt: &str) -> RagResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("answer from the knowledge base".to_string())
    }

    fn name(&self) -> &str {
        "counting-model"
    }
}

fn test_settings(corpus_dir: PathBuf) -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        corpus_dir,
        store_backend: StoreBackend::Memory,
        chroma_url: "http://localhost:8000".to_string(),
        chroma_collection: "test".to_string(),
        openai_api_key: None,
        openai_model: "mock".to_string(),
        embedding_model: "mock".to_string(),
        embedding_dimensions: VOCAB.len(),
        chunk_size: 64,
        chunk_overlap: 16,
        top_k: 4,
        similarity_threshold: 0.1,
    }
}

async fn spawn_server(
    corpus_dir: PathBuf,
) -> (String, Arc<CountingModel>, tokio::task::JoinHandle<()>) {
    let model = Arc::new(CountingModel::default());

    let pipeline = RagPipeline::builder()
        .config(
            RagConfig::builder()
                .chunk_size(64)
                .chunk_overlap(16)
                .top_k(4)
                .similarity_threshold(0.1)
                .build()
                .unwrap(),
        )
        .chunker(Arc::new(RecursiveChunker::new(64, 16).unwrap()))
        .embedding_provider(Arc::new(VocabEmbeddingProvider))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .language_model(model.clone())
        .build()
        .unwrap();

    let state = AppState {
        pipeline: Arc::new(pipeline),
        settings: Arc::new(test_settings(corpus_dir)),
    };
    let app = app_router(state);

    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    (format!("http://{addr}"), model, handle)
}

#[tokio::test]
async fn health_reports_store_and_model() {
    let corpus = TempDir::new().unwrap();
    let (base, _model, handle) = spawn_server(corpus.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/health")).send().await.expect("health response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("health json");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "counting-model");

    handle.abort();
}

#[tokio::test]
async fn ask_on_empty_index_returns_fallback_without_model_call() {
    let corpus = TempDir::new().unwrap();
    let (base, model, handle) = spawn_server(corpus.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/rag/ask"))
        .json(&json!({ "question": "What color is the sky?" }))
        .send()
        .await
        .expect("ask response");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("ask json");
    assert_eq!(body["answer"], NO_CONTEXT_ANSWER);
    assert_eq!(body["total_documents"], 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);

    handle.abort();
}

#[tokio::test]
async fn process_then_ask_round_trip() {
    let corpus = TempDir::new().unwrap();
    std::fs::write(corpus.path().join("sky.txt"), "The sky is blue. The grass is green.")
        .unwrap();
    let (base, model, handle) = spawn_server(corpus.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/documents/process"))
        .send()
        .await
        .expect("process response");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("process json");
    assert_eq!(body["documents_processed"], 1);
    assert!(body["chunks_indexed"].as_u64().unwrap() >= 1);

    let status: Value = client
        .get(format!("{base}/documents/status"))
        .send()
        .await
        .expect("status response")
        .json()
        .await
        .expect("status json");
    assert_eq!(status["corpus_dir_exists"], true);
    assert_eq!(status["files"], 1);
    assert!(status["indexed_records"].as_u64().unwrap() >= 1);

    let answer: Value = client
        .post(format!("{base}/rag/ask"))
        .json(&json!({ "question": "What color is the sky?" }))
        .send()
        .await
        .expect("ask response")
        .json()
        .await
        .expect("ask json");
    assert_eq!(answer["answer"], "answer from the knowledge base");
    assert!(answer["total_documents"].as_u64().unwrap() >= 1);
    assert!(
        answer["relevant_documents"][0]["content"].as_str().unwrap().contains("sky")
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);

    // Above every score: retrieval comes back empty and the fallback
    // answers without another model call.
    let high: Value = client
        .post(format!("{base}/rag/ask"))
        .json(&json!({ "question": "What color is the sky?", "threshold": 0.99 }))
        .send()
        .await
        .expect("ask response")
        .json()
        .await
        .expect("ask json");
    assert_eq!(high["answer"], NO_CONTEXT_ANSWER);
    assert_eq!(high["total_documents"], 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);

    handle.abort();
}

#[tokio::test]
async fn process_without_corpus_directory_is_not_found() {
    let corpus = TempDir::new().unwrap();
    let missing = corpus.path().join("absent");
    let (base, _model, handle) = spawn_server(missing).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/documents/process"))
        .send()
        .await
        .expect("process response");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    handle.abort();
}

#[tokio::test]
async fn invalid_question_parameters_are_bad_requests() {
    let corpus = TempDir::new().unwrap();
    let (base, _model, handle) = spawn_server(corpus.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/rag/ask"))
        .json(&json!({ "question": "anything", "top_k": 0 }))
        .send()
        .await
        .expect("ask response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{base}/rag/ask"))
        .json(&json!({ "question": "anything", "threshold": 1.5 }))
        .send()
        .await
        .expect("ask response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    handle.abort();
}

#[tokio::test]
async fn upload_validates_type_and_duplicates() {
    let corpus = TempDir::new().unwrap();
    let (base, _model, handle) = spawn_server(corpus.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    let form = || {
        reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::text("some notes").file_name("notes.txt"),
        )
    };

    let bad_type = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::text("binary").file_name("tool.exe"),
    );
    let response = client
        .post(format!("{base}/documents/upload"))
        .multipart(bad_type)
        .send()
        .await
        .expect("upload response");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{base}/documents/upload"))
        .multipart(form())
        .send()
        .await
        .expect("upload response");
    assert!(response.status().is_success());
    assert!(corpus.path().join("notes.txt").is_file());

    let response = client
        .post(format!("{base}/documents/upload"))
        .multipart(form())
        .send()
        .await
        .expect("upload response");
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    handle.abort();
}

#[tokio::test]
async fn clear_and_file_removal_reset_the_index() {
    let corpus = TempDir::new().unwrap();
    std::fs::write(corpus.path().join("sky.txt"), "The sky is blue.").unwrap();
    std::fs::write(corpus.path().join("grass.txt"), "The grass is green.").unwrap();
    let (base, _model, handle) = spawn_server(corpus.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/documents/process"))
        .send()
        .await
        .expect("process response");

    let removed = client
        .delete(format!("{base}/documents/files/grass.txt"))
        .send()
        .await
        .expect("remove response");
    assert!(removed.status().is_success());
    assert!(!corpus.path().join("grass.txt").exists());

    let status: Value = client
        .get(format!("{base}/documents/status"))
        .send()
        .await
        .expect("status response")
        .json()
        .await
        .expect("status json");
    assert_eq!(status["files"], 1);
    assert_eq!(status["indexed_records"], 1);

    let missing = client
        .delete(format!("{base}/documents/files/grass.txt"))
        .send()
        .await
        .expect("remove response");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let cleared = client
        .delete(format!("{base}/documents/clear"))
        .send()
        .await
        .expect("clear response");
    assert!(cleared.status().is_success());

    let status: Value = client
        .get(format!("{base}/documents/status"))
        .send()
        .await
        .expect("status response")
        .json()
        .await
        .expect("status json");
    assert_eq!(status["indexed_records"], 0);

    handle.abort();
}
