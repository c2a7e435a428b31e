//! Provider trait: the abstraction over the remote generative service.
//!
//! A Provider turns a prompt plus a system instruction into an ordered,
//! finite, non-restartable stream of text chunks. The grounding core never
//! sees the wire format, only this contract and the error channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Receiver;

use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-3-flash-preview")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// System instruction sent alongside the messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Temperature (0.0 = deterministic, 2.0 = most varied)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl ProviderRequest {
    /// A single-turn request.
    pub fn single(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(prompt)],
            system_instruction: None,
            temperature: default_temperature(),
            max_output_tokens: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,
}

impl StreamChunk {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            content: None,
            done: true,
        }
    }
}

/// Receiving end of a provider stream.
pub type ChunkReceiver = Receiver<std::result::Result<StreamChunk, ProviderError>>;

/// The core Provider trait.
///
/// The generation controller calls `stream()` without knowing which
/// backend answers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and get an ordered stream of response chunks.
    ///
    /// An `Err` item ends the stream; nothing follows it.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError>;

    /// Send a request and wait for the whole text.
    ///
    /// Default implementation drains `stream()`.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<String, ProviderError> {
        let mut rx = self.stream(request).await?;
        let mut text = String::new();
        while let Some(item) = rx.recv().await {
            let chunk = item?;
            if let Some(content) = chunk.content {
                text.push_str(&content);
            }
            if chunk.done {
                break;
            }
        }
        Ok(text)
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoChunks;

    #[async_trait]
    impl Provider for TwoChunks {
        fn name(&self) -> &str {
            "two_chunks"
        }

        async fn stream(&self, _request: ProviderRequest) -> std::result::Result<ChunkReceiver, ProviderError> {
            let (tx, rx) = tokio::sync::mpsc::channel(4);
            tx.send(Ok(StreamChunk::text("Hello, "))).await.unwrap();
            tx.send(Ok(StreamChunk::text("world"))).await.unwrap();
            tx.send(Ok(StreamChunk::done())).await.unwrap();
            Ok(rx)
        }
    }

    #[test]
    fn provider_request_defaults() {
        let req = ProviderRequest::single("gemini-3-flash-preview", "hi");
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.messages.len(), 1);
        assert!(req.system_instruction.is_none());
    }

    #[tokio::test]
    async fn complete_drains_stream() {
        let text = TwoChunks
            .complete(ProviderRequest::single("m", "hi"))
            .await
            .unwrap();
        assert_eq!(text, "Hello, world");
    }
}
