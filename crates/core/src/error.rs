//! Error types for the Groundwell domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum.

use thiserror::Error;

/// The top-level error type for all Groundwell operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Durable store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Live transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Knowledge table errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Store I/O failed: {0}")]
    Io(String),

    #[error("Stored value could not be (de)serialized: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Live transport is not connected")]
    NotConnected,

    #[error("Live transport rejected the payload: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Duplicate knowledge section id: {0}")]
    DuplicateId(String),

    #[error("Fallback section '{0}' is missing from the knowledge table")]
    MissingFallback(String),

    #[error("Fallback section '{0}' has empty content")]
    EmptyFallback(String),

    #[error("Failed to read knowledge table at {path}: {reason}")]
    Read { path: String, reason: String },
}
