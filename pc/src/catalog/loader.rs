//! Catalog Loader
//!
//! Reads the catalog file and unwraps the optional `roles` key.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::error::CatalogError;
use super::model::Catalog;
use crate::ROLES_KEY;

/// Return the category mapping inside a parsed catalog document
///
/// A top-level object with a `roles` key holds the mapping under that key;
/// otherwise the document itself is the mapping.
pub fn category_root(document: &Value) -> &Value {
    match document.get(ROLES_KEY) {
        Some(roles) => {
            debug!("category_root: unwrapping roles key");
            roles
        }
        None => document,
    }
}

/// Parse catalog text
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    debug!(text_len = text.len(), "parse_catalog: called");
    let mut document: Value = serde_json::from_str(text).map_err(CatalogError::Json)?;

    let root = if document.get(ROLES_KEY).is_some() {
        document[ROLES_KEY].take()
    } else {
        document
    };

    let catalog: Catalog = serde_json::from_value(root).map_err(CatalogError::Schema)?;
    debug!(categories = catalog.len(), "parse_catalog: parsed");
    Ok(catalog)
}

/// Load the catalog at `path`
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Option<Catalog>, CatalogError> {
    let path = path.as_ref();
    debug!(?path, "load_catalog: called");

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "load_catalog: file not found");
            return Ok(None);
        }
        Err(source) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let catalog = parse_catalog(&text)?;
    info!("Loaded catalog {} ({} categories)", path.display(), catalog.len());
    Ok(Some(catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    const UNWRAPPED: &str = r#"{"Writer": {"Summarize": {"template": "Summarize: {text}", "vars": {"text": "hello"}}}}"#;

    #[test]
    fn test_parse_unwrapped() {
        let catalog = parse_catalog(UNWRAPPED).unwrap();
        assert_eq!(catalog.len(), 1);
        let task = catalog.category("Writer").unwrap().task("Summarize").unwrap();
        assert_eq!(task.template.as_deref(), Some("Summarize: {text}"));
    }

    #[test]
    fn test_roles_wrapper_matches_unwrapped() {
        let wrapped = format!(r#"{{"roles": {}}}"#, UNWRAPPED);
        assert_eq!(parse_catalog(&wrapped).unwrap(), parse_catalog(UNWRAPPED).unwrap());
    }

    #[test]
    fn test_category_order_preserved() {
        let catalog = parse_catalog(r#"{"Zeta": {}, "Alpha": {}, "Mid": {}}"#).unwrap();
        let names: Vec<&str> = catalog.categories().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_catalog("{\"Writer\": ").unwrap_err();
        assert!(err.is_json());
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        let err = parse_catalog(r#"{"Writer": ["not", "a", "mapping"]}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Schema(_)));
    }

    #[test]
    fn test_category_root() {
        let wrapped = json!({"roles": {"A": {}}});
        assert_eq!(category_root(&wrapped), &json!({"A": {}}));
        let plain = json!({"A": {}});
        assert_eq!(category_root(&plain), &plain);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_catalog(dir.path().join("my_prompts.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("my_prompts.json");
        std::fs::write(&path, UNWRAPPED).unwrap();

        let catalog = load_catalog(&path).unwrap().unwrap();
        assert!(catalog.category("Writer").is_some());
    }
}
