//! Catalog cache keyed by path and modification time

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use super::error::CatalogError;
use super::loader::load_catalog;
use super::model::Catalog;

/// File identity used to detect changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug)]
struct CachedCatalog {
    stamp: Stamp,
    catalog: Arc<Catalog>,
}

/// Holds parsed catalogs and re-reads a file only when it changes
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: HashMap<PathBuf, CachedCatalog>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the catalog at `path`, loading it if absent or changed on disk
    ///
    /// Returns `Ok(None)` when the file does not exist. A failed load leaves
    /// no entry behind, so the next call retries.
    pub fn get(&mut self, path: impl AsRef<Path>) -> Result<Option<Arc<Catalog>>, CatalogError> {
        let path = path.as_ref();

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.entries.remove(path).is_some() {
                    debug!(?path, "CatalogCache::get: file vanished, evicted entry");
                }
                return Ok(None);
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let stamp = Stamp {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        };

        if let Some(entry) = self.entries.get(path)
            && entry.stamp == stamp
        {
            return Ok(Some(Arc::clone(&entry.catalog)));
        }

        debug!(?path, "CatalogCache::get: loading");
        self.entries.remove(path);
        let Some(catalog) = load_catalog(path)? else {
            return Ok(None);
        };

        let catalog = Arc::new(catalog);
        self.entries.insert(
            path.to_path_buf(),
            CachedCatalog {
                stamp,
                catalog: Arc::clone(&catalog),
            },
        );
        Ok(Some(catalog))
    }

    /// Drop the entry for `path`, forcing the next lookup to re-read it
    pub fn invalidate(&mut self, path: impl AsRef<Path>) {
        self.entries.remove(path.as_ref());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ONE: &str = r#"{"Writer": {}}"#;
    const TWO: &str = r#"{"Writer": {}, "Coder": {}}"#;

    #[test]
    fn test_unchanged_file_returns_same_arc() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("my_prompts.json");
        std::fs::write(&path, ONE).unwrap();

        let mut cache = CatalogCache::new();
        let first = cache.get(&path).unwrap().unwrap();
        let second = cache.get(&path).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_file_is_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("my_prompts.json");
        std::fs::write(&path, ONE).unwrap();

        let mut cache = CatalogCache::new();
        let first = cache.get(&path).unwrap().unwrap();
        assert_eq!(first.len(), 1);

        // Different length guarantees a new stamp even with coarse mtimes
        std::fs::write(&path, TWO).unwrap();
        let second = cache.get(&path).unwrap().unwrap();
        assert_eq!(second.len(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_file_evicts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("my_prompts.json");
        std::fs::write(&path, ONE).unwrap();

        let mut cache = CatalogCache::new();
        assert!(cache.get(&path).unwrap().is_some());

        std::fs::remove_file(&path).unwrap();
        assert!(cache.get(&path).unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("my_prompts.json");
        std::fs::write(&path, ONE).unwrap();

        let mut cache = CatalogCache::new();
        let first = cache.get(&path).unwrap().unwrap();
        cache.invalidate(&path);
        let second = cache.get(&path).unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_malformed_file_is_not_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("my_prompts.json");
        std::fs::write(&path, "{").unwrap();

        let mut cache = CatalogCache::new();
        assert!(cache.get(&path).is_err());
        assert!(cache.is_empty());
    }
}
