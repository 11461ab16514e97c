//! HTTP error mapping for the service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ragdoc_core::RagError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by request handlers.
///
/// Pipeline errors keep their kind: caller errors map to 4xx, collaborator
/// failures to 502 so that upstream outages are distinguishable from bugs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rag(#[from] RagError),

    #[error("unsupported file type: '{0}'")]
    UnsupportedFileType(String),

    #[error("file '{0}' already exists")]
    FileExists(String),

    #[error("file '{0}' is too large")]
    FileTooLarge(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Rag(RagError::InvalidConfiguration(_)) => StatusCode::BAD_REQUEST,
            Self::Rag(RagError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Rag(_) => StatusCode::BAD_GATEWAY,
            Self::UnsupportedFileType(_) | Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::FileExists(_) => StatusCode::CONFLICT,
            Self::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(%status, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
