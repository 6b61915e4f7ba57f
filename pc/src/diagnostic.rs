//! Diagnostic Page
//!
//! Lists a directory and re-validates the catalog file inside it. Read-only:
//! the file is never modified and the browser's cache is not touched.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::category_root;

/// Hint shown when the catalog file is not in the directory
pub const MISSING_HINT: &str = "File names are case-sensitive; make sure the file was copied or uploaded into this directory";

/// Outcome of checking the catalog file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticStatus {
    /// No entry with the expected name
    Missing,
    /// Present but not a usable JSON document
    Malformed { detail: String },
    /// Parsed successfully
    Valid { category_count: usize },
}

/// Directory listing plus catalog status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// Directory that was inspected
    pub dir: String,
    /// File name that was looked for
    pub filename: String,
    /// Sorted entries, directories suffixed with `/`
    pub entries: Vec<String>,
    pub status: DiagnosticStatus,
}

impl DiagnosticReport {
    pub fn is_valid(&self) -> bool {
        matches!(self.status, DiagnosticStatus::Valid { .. })
    }

    /// One-line summary of the status
    pub fn summary(&self) -> String {
        match &self.status {
            DiagnosticStatus::Missing => format!("{} not found in {}", self.filename, self.dir),
            DiagnosticStatus::Malformed { detail } => format!("{} is not valid JSON: {}", self.filename, detail),
            DiagnosticStatus::Valid { category_count } => {
                format!("{} loaded: {} categories", self.filename, category_count)
            }
        }
    }
}

/// Split a catalog path into the directory to inspect and the name to look for
pub fn locate(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::DEFAULT_CATALOG_FILENAME.to_string());
    (dir, filename)
}

/// Inspect `dir` and validate `filename` inside it
pub fn diagnose(dir: &Path, filename: &str) -> Result<DiagnosticReport> {
    debug!(?dir, %filename, "diagnose: called");
    let mut entries = Vec::new();
    let mut present = false;

    for entry in std::fs::read_dir(dir).context(format!("Failed to list {}", dir.display()))? {
        let entry = entry.context("Failed to read directory entry")?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == filename {
            present = true;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push(if is_dir { format!("{}/", name) } else { name });
    }
    entries.sort();

    let status = if present {
        check_file(&dir.join(filename))
    } else {
        debug!("diagnose: file not in listing, skipping parse");
        DiagnosticStatus::Missing
    };

    info!("Diagnostics for {}: {:?}", dir.display(), status);
    Ok(DiagnosticReport {
        dir: dir.display().to_string(),
        filename: filename.to_string(),
        entries,
        status,
    })
}

fn check_file(path: &Path) -> DiagnosticStatus {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return DiagnosticStatus::Malformed {
                detail: format!("cannot read file: {}", e),
            };
        }
    };

    let document: Value = match serde_json::from_str(&text) {
        Ok(document) => document,
        Err(e) => return DiagnosticStatus::Malformed { detail: e.to_string() },
    };

    match category_root(&document) {
        Value::Object(map) => DiagnosticStatus::Valid {
            category_count: map.len(),
        },
        _ => DiagnosticStatus::Malformed {
            detail: "top-level value is not an object".to_string(),
        },
    }
}
