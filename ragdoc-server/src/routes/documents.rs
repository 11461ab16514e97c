//! Corpus and index management endpoints.

use std::fs;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use ragdoc_core::RagError;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;
use crate::loader::{self, is_supported};
use crate::state::AppState;

/// Upload size cap.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn validate_file_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(ApiError::InvalidUpload(format!("invalid file name '{name}'")));
    }
    if !is_supported(name) {
        return Err(ApiError::UnsupportedFileType(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub documents_processed: usize,
    pub chunks_indexed: usize,
}

/// `POST /documents/process` — load the corpus directory, chunk every
/// document, and index the chunks.
///
/// Re-processing without clearing first duplicates records in the store.
pub async fn process(State(state): State<AppState>) -> Result<Json<ProcessResponse>, ApiError> {
    let documents = loader::load_corpus(&state.settings.corpus_dir)?;
    let report = state.pipeline.index_documents(&documents).await?;

    let total = state.pipeline.vector_store().count().await?;
    info!(
        documents = report.documents,
        chunks = report.chunks,
        store_records = total,
        "processed corpus"
    );

    Ok(Json(ProcessResponse {
        message: "documents processed successfully".to_string(),
        documents_processed: report.documents,
        chunks_indexed: report.chunks,
    }))
}

/// `GET /documents/status` — corpus directory and index overview.
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let corpus_dir = &state.settings.corpus_dir;
    let files = loader::list_corpus_files(corpus_dir)?;
    let indexed_records = state.pipeline.vector_store().count().await?;

    Ok(Json(json!({
        "corpus_dir_exists": corpus_dir.is_dir(),
        "files": files.len(),
        "indexed_records": indexed_records,
        "file_list": files,
    })))
}

/// `DELETE /documents/clear` — remove every record from the vector store.
pub async fn clear(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.pipeline.vector_store().clear(None).await?;
    info!("cleared vector store");
    Ok(Json(json!({
        "message": "vector store cleared",
        "records_removed": true,
    })))
}

/// `POST /documents/upload` — save one plain-text corpus file.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.to_string()))?
        .ok_or_else(|| ApiError::InvalidUpload("missing file field".to_string()))?;

    let name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| ApiError::InvalidUpload("missing file name".to_string()))?;
    validate_file_name(&name)?;

    let data = field.bytes().await.map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::FileTooLarge(name));
    }

    let corpus_dir = &state.settings.corpus_dir;
    fs::create_dir_all(corpus_dir)?;
    let path = corpus_dir.join(&name);
    if path.exists() {
        return Err(ApiError::FileExists(name));
    }
    fs::write(&path, &data)?;

    info!(file = %name, bytes = data.len(), "uploaded corpus file");
    Ok(Json(json!({
        "message": "file uploaded successfully",
        "file_name": name,
        "size": data.len(),
    })))
}

/// `GET /documents/files` — list the corpus files.
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let files = loader::list_corpus_files(&state.settings.corpus_dir)?;
    let total = files.len();
    Ok(Json(json!({ "files": files, "total": total })))
}

/// `DELETE /documents/files/{name}` — remove one corpus file and its
/// indexed chunks.
pub async fn remove_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_file_name(&name)?;

    let path = state.settings.corpus_dir.join(&name);
    if !path.is_file() {
        return Err(RagError::NotFound(format!("file '{name}' not found")).into());
    }
    fs::remove_file(&path)?;
    state.pipeline.vector_store().clear(Some(&name)).await?;

    info!(file = %name, "removed corpus file and its records");
    Ok(Json(json!({
        "message": "file removed",
        "removed": name,
    })))
}
