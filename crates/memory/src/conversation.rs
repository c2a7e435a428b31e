//! Bounded short-term conversational memory.
//!
//! The last `capacity` turns are kept as a JSON array under one namespaced
//! key in a [`KeyValueStore`]. Every operation is best-effort: storage
//! failures are logged and never reach the caller. After a failed write,
//! memory degrades to a session-only copy until the store accepts writes
//! again.

use std::sync::{Arc, Mutex, MutexGuard};

use groundwell_core::clock::Clock;
use groundwell_core::error::StoreError;
use groundwell_core::event::{DomainEvent, EventBus};
use groundwell_core::message::Role;
use groundwell_core::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Storage key shared with earlier deployments.
pub const MEMORY_KEY: &str = "ai_short_term_memory";

/// Maximum number of retained turns.
pub const DEFAULT_CAPACITY: usize = 10;

/// One remembered turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub role: Role,
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Default)]
struct SessionState {
    entries: Vec<MemoryEntry>,
    degraded: bool,
}

/// Capped, persisted log of prior turns.
pub struct ConversationMemory {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    capacity: usize,
    events: Option<Arc<EventBus>>,
    // Serializes read-modify-write and mirrors the last known log.
    session: Mutex<SessionState>,
}

impl ConversationMemory {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            key: MEMORY_KEY.into(),
            capacity: DEFAULT_CAPACITY,
            events: None,
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the cap, clamped to `1..=DEFAULT_CAPACITY`.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.clamp(1, DEFAULT_CAPACITY);
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a turn, keep the newest `capacity`, and persist.
    pub fn remember(&self, role: Role, text: &str) {
        let mut session = self.lock();

        let mut entries = if session.degraded {
            session.entries.clone()
        } else {
            match self.load() {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Stored memory unreadable, starting from session copy");
                    session.entries.clone()
                }
            }
        };

        entries.push(MemoryEntry {
            role,
            text: text.to_string(),
            timestamp: self.clock.now_millis(),
        });
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }

        match self.persist(&entries) {
            Ok(()) => session.degraded = false,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Failed to save to memory");
                session.degraded = true;
                if let Some(events) = &self.events {
                    events.publish(DomainEvent::MemoryWriteFailed {
                        error_message: e.to_string(),
                        timestamp: self.clock.now(),
                    });
                }
            }
        }

        debug!(entries = entries.len(), "Turn remembered");
        session.entries = entries;
    }

    /// Render remembered turns as `User: …` / `AI: …` lines, oldest first.
    /// Absent or corrupt data renders as the empty string.
    pub fn recall(&self) -> String {
        let session = self.lock();

        let entries = if session.degraded {
            session.entries.clone()
        } else {
            match self.store.get(&self.key) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<MemoryEntry>>(&raw) {
                    Ok(entries) => entries,
                    Err(e) => {
                        debug!(error = %e, "Stored memory is corrupt, treating as empty");
                        Vec::new()
                    }
                },
                Ok(None) => Vec::new(),
                Err(e) => {
                    warn!(error = %e, "Memory store unreadable, using session copy");
                    session.entries.clone()
                }
            }
        };

        render(&entries)
    }

    /// Entries currently visible to `recall`.
    pub fn entries(&self) -> Vec<MemoryEntry> {
        let session = self.lock();
        if session.degraded {
            return session.entries.clone();
        }
        self.load().unwrap_or_default()
    }

    /// Delete the persisted log and the session copy.
    pub fn forget(&self) {
        let mut session = self.lock();
        session.entries.clear();
        session.degraded = false;
        if let Err(e) = self.store.remove(&self.key) {
            warn!(store = self.store.name(), error = %e, "Failed to clear memory");
        }
    }

    fn load(&self) -> Result<Vec<MemoryEntry>, StoreError> {
        match self.store.get(&self.key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, entries: &[MemoryEntry]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &raw)
    }
}

fn render(entries: &[MemoryEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {}", e.role.transcript_label(), e.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;
    use crate::noop::NoopStore;
    use chrono::{TimeZone, Utc};
    use groundwell_core::clock::FixedClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()))
    }

    fn memory_over(store: Arc<dyn KeyValueStore>) -> ConversationMemory {
        ConversationMemory::new(store, clock())
    }

    /// A store whose reads work but whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "read_only"
        }
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("storage disabled".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("storage disabled".into()))
        }
    }

    #[test]
    fn empty_memory_recalls_empty_string() {
        let memory = memory_over(Arc::new(InMemoryStore::new()));
        assert_eq!(memory.recall(), "");
    }

    #[test]
    fn recall_renders_labels_in_order() {
        let memory = memory_over(Arc::new(InMemoryStore::new()));
        memory.remember(Role::User, "hi");
        memory.remember(Role::Model, "hello there");
        assert_eq!(memory.recall(), "User: hi\nAI: hello there");
    }

    #[test]
    fn fifteen_turns_keep_last_ten_in_order() {
        let memory = memory_over(Arc::new(InMemoryStore::new()));
        for i in 0..15 {
            let role = if i % 2 == 0 { Role::User } else { Role::Model };
            memory.remember(role, &format!("turn {i}"));
        }

        let entries = memory.entries();
        assert_eq!(entries.len(), 10);
        let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
        let expected: Vec<String> = (5..15).map(|i| format!("turn {i}")).collect();
        assert_eq!(texts, expected);

        let recalled = memory.recall();
        assert_eq!(recalled.lines().count(), 10);
        assert!(recalled.starts_with("AI: turn 5"));
        assert!(recalled.ends_with("User: turn 14"));
    }

    #[test]
    fn forget_then_recall_is_empty() {
        let store = Arc::new(InMemoryStore::new());
        let memory = memory_over(store.clone());
        memory.remember(Role::User, "remember me");
        memory.forget();
        assert_eq!(memory.recall(), "");
        assert_eq!(store.get(MEMORY_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_data_recalls_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.set(MEMORY_KEY, "{not json").unwrap();
        let memory = memory_over(store.clone());
        assert_eq!(memory.recall(), "");

        // The next turn replaces the corrupt value.
        memory.remember(Role::User, "fresh start");
        assert_eq!(memory.recall(), "User: fresh start");
    }

    #[test]
    fn persisted_format_is_json_array() {
        let store = Arc::new(InMemoryStore::new());
        let memory = memory_over(store.clone());
        memory.remember(Role::Model, "ok");

        let raw = store.get(MEMORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["role"], "model");
        assert_eq!(value[0]["text"], "ok");
        assert_eq!(
            value[0]["timestamp"],
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap().timestamp_millis()
        );
    }

    #[test]
    fn reads_existing_log_from_store() {
        let store = Arc::new(InMemoryStore::new());
        store
            .set(
                MEMORY_KEY,
                r#"[{"role":"user","text":"earlier","timestamp":1}]"#,
            )
            .unwrap();
        let memory = memory_over(store);
        assert_eq!(memory.recall(), "User: earlier");
    }

    #[test]
    fn write_failure_degrades_to_session_copy() {
        let events = Arc::new(EventBus::new(8));
        let mut rx = events.subscribe();
        let memory = memory_over(Arc::new(ReadOnlyStore)).with_events(events);

        memory.remember(Role::User, "still here");
        assert_eq!(memory.recall(), "User: still here");
        assert!(matches!(
            rx.try_recv().unwrap().as_ref(),
            DomainEvent::MemoryWriteFailed { .. }
        ));

        memory.forget();
        assert_eq!(memory.recall(), "");
    }

    #[test]
    fn quota_failure_is_not_raised() {
        let memory = memory_over(Arc::new(InMemoryStore::with_quota(64)));
        memory.remember(Role::User, &"x".repeat(200));
        assert_eq!(memory.entries().len(), 1);
    }

    #[test]
    fn noop_store_never_recalls() {
        let memory = memory_over(Arc::new(NoopStore));
        memory.remember(Role::User, "gone");
        assert_eq!(memory.recall(), "");
    }

    #[test]
    fn capacity_is_clamped() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        assert_eq!(memory_over(store.clone()).with_capacity(0).capacity(), 1);
        assert_eq!(memory_over(store.clone()).with_capacity(50).capacity(), 10);

        let memory = memory_over(store).with_capacity(3);
        for i in 0..5 {
            memory.remember(Role::User, &i.to_string());
        }
        assert_eq!(memory.recall(), "User: 2\nUser: 3\nUser: 4");
    }
}
