//! File-based store: a persistent JSON object on disk.
//!
//! The whole store is one JSON object mapping keys to string values, so the
//! file stays human-inspectable and portable.
//!
//! Storage location: `~/.groundwell/memory/store.json`
//!
//! Values are loaded on creation and flushed on every mutation. Writes go
//! to a sibling temp file first and are renamed into place.

use groundwell_core::error::StoreError;
use groundwell_core::store::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed key-value store.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open a store at the given path.
    ///
    /// A missing file starts empty (created on first write). A corrupt file
    /// is logged and treated as empty; it is overwritten on the next write.
    pub fn new(path: PathBuf) -> Self {
        let entries = Self::load_from_disk(&path);
        debug!(path = %path.display(), keys = entries.len(), "File store loaded");
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };

        if content.trim().is_empty() {
            return BTreeMap::new();
        }

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring corrupted store file");
            BTreeMap::new()
        })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("Failed to create store directory: {e}")))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| StoreError::Io(format!("Failed to write store file: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Io(format!("Failed to replace store file: {e}")))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Err(e) = self.flush(&entries) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::new(path.clone());
        store.set("greeting", "hello").unwrap();
        assert!(path.exists());

        let reopened = FileStore::new(path);
        assert_eq!(reopened.get("greeting").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::new(path.clone());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        let reopened = FileStore::new(path);
        assert_eq!(reopened.get("a").unwrap(), None);
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("anything").unwrap(), None);
        store.remove("anything").unwrap();
    }

    #[test]
    fn corrupted_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "this is not json").unwrap();

        let store = FileStore::new(path.clone());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        let reopened = FileStore::new(path);
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("store.json");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let store = FileStore::new(path);
        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }
}
