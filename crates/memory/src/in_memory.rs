//! In-memory store for tests and ephemeral sessions.

use groundwell_core::error::StoreError;
use groundwell_core::store::KeyValueStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// A store that keeps values in a `HashMap` for the life of the process.
///
/// An optional byte quota mimics browser storage limits: a write whose
/// total stored size would exceed it fails with `QuotaExceeded`.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: None,
        }
    }

    /// Limit total stored bytes (keys plus values).
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
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

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded(format!(
                    "{needed} bytes requested, quota is {quota}"
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert!(store.is_empty());
        store.remove("k").unwrap();
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let store = InMemoryStore::with_quota(8);
        store.set("k", "1234567").unwrap();
        let err = store.set("k2", "x").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded(_)));
        // Overwriting the same key only counts the new value.
        store.set("k", "abcdefg").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("abcdefg"));
    }
}
