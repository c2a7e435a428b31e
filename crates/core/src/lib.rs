//! # Groundwell Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! Groundwell grounding layer. This crate has **no orchestration logic**.
//! It defines the model that every other crate implements against.
//!
//! ## Collaborators
//!
//! Everything outside the grounding core is reached through a trait here:
//! - [`Provider`]: the remote generative service (streamed text)
//! - [`LiveTransport`]: the duplex voice session
//! - [`KeyValueStore`]: durable, synchronous, fallible storage
//! - [`Clock`]: wall-clock time and locale rendering
//!
//! Tests substitute each of them with a deterministic double.

pub mod clock;
pub mod error;
pub mod event;
pub mod identity;
pub mod message;
pub mod persona;
pub mod provider;
pub mod store;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, KnowledgeError, ProviderError, Result, StoreError, TransportError};
pub use event::{DomainEvent, EventBus};
pub use identity::{CreatorIdentity, IDENTITY_BLOCK, OWNER};
pub use message::{Message, Role};
pub use persona::{PersonaDescriptor, UserProfile, Voice};
pub use provider::{Provider, ProviderRequest, StreamChunk};
pub use store::KeyValueStore;
pub use transport::{LiveConfig, LivePayload, LiveTransport, ResponseModality};
