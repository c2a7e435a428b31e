//! Duplex live-session transport capability.
//!
//! The network/audio session object lives outside the grounding core.
//! The core only writes `push_config` and `send`, and only reads
//! `is_connected`; `volume` is exposed for rendering surfaces.

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::persona::Voice;

/// Output modality requested from the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Audio,
    Text,
}

/// The session configuration pushed into the transport's config slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveConfig {
    pub response_modality: ResponseModality,
    pub voice: Voice,
    pub system_instruction: String,
}

/// Something sent into the live session as a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LivePayload {
    /// A text turn, attributed to the user.
    Text { text: String },
    /// Raw PCM audio.
    Audio {
        mime_type: String,
        data: Vec<u8>,
    },
}

impl LivePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Audio { .. } => None,
        }
    }
}

/// The core LiveTransport trait.
///
/// Pushes are fire-and-forget: a synchronous `Err` means the transport
/// refused outright, and callers log it.
pub trait LiveTransport: Send + Sync {
    /// Whether the duplex session is currently connected.
    fn is_connected(&self) -> bool;

    /// Current output volume level (0.0–1.0).
    fn volume(&self) -> f32;

    /// Send a turn. `end_of_turn` asks the remote agent to respond.
    fn send(&self, payload: LivePayload, end_of_turn: bool) -> Result<(), TransportError>;

    /// Replace the session configuration.
    fn push_config(&self, config: LiveConfig) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_config_wire_shape() {
        let config = LiveConfig {
            response_modality: ResponseModality::Audio,
            voice: Voice::Fenrir,
            system_instruction: "be brief".into(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""responseModality":"AUDIO""#));
        assert!(json.contains(r#""voice":"Fenrir""#));
        assert!(json.contains(r#""systemInstruction":"be brief""#));
    }

    #[test]
    fn payload_text_accessor() {
        assert_eq!(LivePayload::text("hi").as_text(), Some("hi"));
        let audio = LivePayload::Audio {
            mime_type: "audio/pcm;rate=16000".into(),
            data: vec![0, 1],
        };
        assert_eq!(audio.as_text(), None);
    }
}
