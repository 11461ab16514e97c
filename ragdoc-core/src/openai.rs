//! OpenAI collaborators: embeddings and chat completions over the REST API.
//!
//! This module is only available when the `openai` feature is enabled.
//! Both clients call the API directly with `reqwest` rather than pulling in
//! a full SDK; the pipeline needs exactly one endpoint from each.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::model::LanguageModel;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Dimensionality of `text-embedding-3-small` embeddings.
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// The default chat model.
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Decode an error body, falling back to the raw text when it isn't the
/// documented `{"error": {"message": ...}}` shape.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn require_api_key(api_key: String, what: &str) -> Result<String> {
    if api_key.is_empty() {
        return Err(RagError::InvalidConfiguration(format!("{what} API key must not be empty")));
    }
    Ok(api_key)
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment
///   variable via [`from_env`](OpenAIEmbeddingProvider::from_env).
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: require_api_key(api_key.into(), "OpenAI embeddings")?,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Create a new provider from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::InvalidConfiguration(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;
        Self::new(api_key)
    }

    /// Set the embedding model and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), model = %self.model, "embedding text");

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: text })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                RagError::Embedding {
                    provider: "OpenAI".to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "OpenAI", %status, "embeddings API error");
            return Err(RagError::Embedding {
                provider: "OpenAI".to_string(),
                message: format!("API returned {status}: {}", error_detail(&body)),
            });
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| RagError::Embedding {
            provider: "OpenAI".to_string(),
            message: format!("failed to parse response: {e}"),
        })?;

        parsed.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| RagError::Embedding {
            provider: "OpenAI".to_string(),
            message: "API returned no embedding".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat model ─────────────────────────────────────────────────────

/// A [`LanguageModel`] backed by the OpenAI chat completions API.
///
/// Single-shot, non-streaming: one user message in, one message out.
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAIChatModel {
    /// Create a new chat model client with the given API key and the
    /// default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: require_api_key(api_key.into(), "OpenAI chat")?,
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    /// Create a new client from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::InvalidConfiguration(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gpt-4o-mini`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn model_error(&self, message: String) -> RagError {
        RagError::Model { model: self.model.clone(), message }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "completion request failed");
                self.model_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.model, %status, "chat completions API error");
            return Err(self.model_error(format!(
                "API returned {status}: {}",
                error_detail(&body)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.model_error(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| self.model_error("API returned no completion".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
