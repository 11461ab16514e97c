//! HTTP service around the ragdoc question-answering pipeline.
//!
//! The router, handlers, and settings live here so integration tests can
//! assemble the app against mock collaborators; `main.rs` is only the
//! composition root plus `run_server`.

pub mod config;
pub mod error;
pub mod loader;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::Settings;
pub use state::AppState;

/// Build the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/config", get(show_config))
        .route("/rag/ask", post(routes::rag::ask))
        .route("/documents/process", post(routes::documents::process))
        .route("/documents/status", get(routes::documents::status))
        .route("/documents/clear", delete(routes::documents::clear))
        .route("/documents/upload", post(routes::documents::upload))
        .route("/documents/files", get(routes::documents::list_files))
        .route("/documents/files/{name}", delete(routes::documents::remove_file))
        .layer(DefaultBodyLimit::max(routes::documents::MAX_UPLOAD_BYTES + 64 * 1024))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.settings.host, state.settings.port)
        .parse()
        .with_context(|| "invalid host/port for ragdoc server")?;

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("ragdoc listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "config": "/config",
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store_status = match state.pipeline.vector_store().count().await {
        Ok(records) => format!("healthy ({records} records)"),
        Err(e) => format!("error: {e}"),
    };

    Json(json!({
        "status": "healthy",
        "store_status": store_status,
        "model": state.pipeline.language_model().name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn show_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.settings.public())
}
