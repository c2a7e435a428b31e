//! Durable key-value store capability.
//!
//! Modeled on browser-style local storage: string keys, string values,
//! synchronous, and allowed to fail (unavailable, quota, I/O). Callers
//! that must not fail (conversational memory) catch errors themselves.

use crate::error::StoreError;

/// The core KeyValueStore trait.
///
/// Implementations: JSON file, in-memory (for testing), none (no-op).
pub trait KeyValueStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory", "none").
    fn name(&self) -> &str;

    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
