//! Catalog error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Unexpected catalog structure: {0}")]
    Schema(#[source] serde_json::Error),
}

impl CatalogError {
    /// True when the file content could not be parsed as JSON at all
    pub fn is_json(&self) -> bool {
        matches!(self, CatalogError::Json(_))
    }
}
