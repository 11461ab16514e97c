//! Corpus loading: plain-text files from the corpus directory.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use ragdoc_core::{Document, RagError};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;

/// File extensions ingested as plain text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Whether a file name carries one of the supported extensions.
pub fn is_supported(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Load every supported file in the corpus directory as a [`Document`].
///
/// Files are loaded in name order so ingestion is deterministic. An empty
/// directory yields an empty batch; a missing directory is an error.
///
/// # Errors
///
/// Returns [`RagError::NotFound`] when the directory does not exist.
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>, ApiError> {
    if !dir.is_dir() {
        return Err(RagError::NotFound(format!(
            "corpus directory '{}' does not exist",
            dir.display()
        ))
        .into());
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.file_name().and_then(|n| n.to_str()).is_some_and(is_supported)
        })
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)?;
        let source_id =
            path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        debug!(source_id = %source_id, chars = text.chars().count(), "loaded corpus file");

        let mut document = Document::new(source_id, text);
        document.metadata.insert("path".to_string(), path.display().to_string());
        documents.push(document);
    }
    Ok(documents)
}

/// A corpus file as reported by the listing endpoints.
#[derive(Debug, Serialize)]
pub struct CorpusFile {
    pub name: String,
    pub size: u64,
    /// Seconds since the epoch, when the filesystem reports it.
    pub modified: Option<u64>,
}

/// List the supported files in the corpus directory, by name.
///
/// A missing directory yields an empty listing here; only ingestion treats
/// it as an error.
pub fn list_corpus_files(dir: &Path) -> std::io::Result<Vec<CorpusFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if !path.is_file() || !is_supported(&name) {
            continue;
        }

        let metadata = entry.metadata()?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());
        files.push(CorpusFile { name, size: metadata.len(), modified });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
