//! Question-answering endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Overrides the configured default when present.
    pub top_k: Option<usize>,
    /// Overrides the configured default when present.
    pub threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct RelevantDocument {
    pub content: String,
    pub score: f32,
    pub source_id: String,
    pub start_offset: usize,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub relevant_documents: Vec<RelevantDocument>,
    pub total_documents: usize,
}

/// `POST /rag/ask` — answer a question from the indexed corpus, returning
/// the retrieved chunks as citations.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let top_k = request.top_k.unwrap_or(state.settings.top_k);
    let threshold = request.threshold.unwrap_or(state.settings.similarity_threshold);
    info!(question = %request.question, top_k, threshold, "processing question");

    let outcome = state.pipeline.process_question(&request.question, top_k, threshold).await?;

    let relevant_documents: Vec<RelevantDocument> = outcome
        .results
        .into_iter()
        .map(|result| RelevantDocument {
            content: result.record.content,
            score: result.score,
            source_id: result.record.source_id,
            start_offset: result.record.start_offset,
        })
        .collect();
    let total_documents = relevant_documents.len();

    Ok(Json(AskResponse {
        question: request.question,
        answer: outcome.answer,
        relevant_documents,
        total_documents,
    }))
}
