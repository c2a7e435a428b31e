//! Key-value store backends and conversational memory for Groundwell.

pub mod conversation;
pub mod file_backend;
pub mod in_memory;
pub mod noop;

pub use conversation::{ConversationMemory, MemoryEntry, DEFAULT_CAPACITY, MEMORY_KEY};
pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
pub use noop::NoopStore;
