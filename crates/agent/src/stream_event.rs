//! Generation-level streaming events.
//!
//! `GenerationEvent` is what the controller surfaces to its caller while a
//! request runs, so a rendering surface can update incrementally:
//! - `stage`: the request trace moved to a new stage
//! - `chunk`: partial text from the service
//! - `done` : stream complete, with latency
//! - `error`: the request failed; `message` replaces the visible output

use serde::{Deserialize, Serialize};

use crate::trace::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    Stage { stage: Stage },

    Chunk { content: String },

    Done { latency_ms: u64 },

    Error { message: String },
}

impl GenerationEvent {
    /// SSE-style event name.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Stage { .. } => "stage",
            Self::Chunk { .. } => "chunk",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}
