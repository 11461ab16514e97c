//! Environment-driven service settings.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use ragdoc_core::error::{RagError, Result};
use serde::Serialize;

/// Which vector store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, lost on restart. The default for development.
    Memory,
    /// A remote Chroma server.
    Chroma,
}

impl FromStr for StoreBackend {
    type Err = RagError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "chroma" => Ok(Self::Chroma),
            other => Err(RagError::InvalidConfiguration(format!(
                "unknown store backend '{other}' (expected 'memory' or 'chroma')"
            ))),
        }
    }
}

/// Read an environment variable, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| RagError::InvalidConfiguration(format!("{name}='{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Service settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory holding the source corpus files.
    pub corpus_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub chroma_url: String,
    pub chroma_collection: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Default number of results when a question does not override it.
    pub top_k: usize,
    /// Default minimum similarity score when a question does not override it.
    pub similarity_threshold: f32,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] when a variable is set
    /// but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env_or("RAGDOC_HOST", "0.0.0.0".to_string())?,
            port: env_or("RAGDOC_PORT", 8080u16)?,
            corpus_dir: PathBuf::from(env_or("CORPUS_DIR", "corpus".to_string())?),
            store_backend: env_or("STORE_BACKEND", StoreBackend::Memory)?,
            chroma_url: env_or("CHROMA_URL", "http://localhost:8000".to_string())?,
            chroma_collection: env_or("CHROMA_COLLECTION", "ragdoc".to_string())?,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: env_or("OPENAI_MODEL", "gpt-3.5-turbo".to_string())?,
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small".to_string())?,
            embedding_dimensions: env_or("EMBEDDING_DIMENSIONS", 1536usize)?,
            chunk_size: env_or("CHUNK_SIZE", 2000usize)?,
            chunk_overlap: env_or("CHUNK_OVERLAP", 500usize)?,
            top_k: env_or("TOP_K_DEFAULT", 4usize)?,
            similarity_threshold: env_or("SIMILARITY_THRESHOLD", 0.7f32)?,
        })
    }

    /// Non-sensitive view served by `GET /config`.
    pub fn public(&self) -> PublicSettings {
        PublicSettings {
            app_name: env!("CARGO_PKG_NAME"),
            app_version: env!("CARGO_PKG_VERSION"),
            store_backend: self.store_backend,
            chroma_collection: self.chroma_collection.clone(),
            corpus_dir: self.corpus_dir.display().to_string(),
            openai_model: self.openai_model.clone(),
            embedding_model: self.embedding_model.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

/// The subset of [`Settings`] safe to expose over HTTP.
#[derive(Debug, Serialize)]
pub struct PublicSettings {
    pub app_name: &'static str,
    pub app_version: &'static str,
    pub store_backend: StoreBackend,
    pub chroma_collection: String,
    pub corpus_dir: String,
    pub openai_model: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub similarity_threshold: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_known_names() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("Chroma".parse::<StoreBackend>().unwrap(), StoreBackend::Chroma);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }
}
