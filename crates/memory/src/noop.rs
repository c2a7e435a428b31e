//! No-op store: disables persistence entirely.

use groundwell_core::error::StoreError;
use groundwell_core::store::KeyValueStore;

/// A store that keeps nothing. Every read misses.
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn name(&self) -> &str {
        "none"
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
