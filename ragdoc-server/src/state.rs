//! Shared application state.

use std::sync::Arc;

use ragdoc_core::RagPipeline;

use crate::config::Settings;

/// State injected into every handler: the pipeline (holding the one shared
/// vector store handle) and the resolved settings.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
    pub settings: Arc<Settings>,
}
