//! Google Gemini provider implementation.
//!
//! Streams `models/{model}:streamGenerateContent` over server-sent events.
//! Each `data:` line carries one `GenerateContentResponse`; the text parts
//! of its first candidate become content chunks. An `error` object inside
//! the stream ends it with `StreamInterrupted`; an unparseable line ends
//! it with `MalformedResponse`.

use async_trait::async_trait;
use futures::StreamExt;
use groundwell_core::error::ProviderError;
use groundwell_core::message::Message;
use groundwell_core::provider::*;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default REST endpoint for the Generative Language API.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini streaming provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider against `base_url` with a request timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Public endpoint with the default timeout (convenience constructor).
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(DEFAULT_API_URL, api_key, Duration::from_secs(120))
    }

    fn stream_url(&self, model: &str) -> String {
        format!("{}/models/{}:streamGenerateContent?alt=sse", self.base_url, model)
    }

    /// Request body for `streamGenerateContent`.
    pub(crate) fn build_body(request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": to_api_contents(&request.messages),
            "generationConfig": { "temperature": request.temperature },
        });

        if let Some(instruction) = &request.system_instruction {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": instruction }] });
        }

        if let Some(max_tokens) = request.max_output_tokens {
            body["generationConfig"]["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        body
    }
}

fn to_api_contents(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role.to_string(),
                "parts": [{ "text": m.content }],
            })
        })
        .collect()
}

/// What one SSE `data:` payload means for the consumer.
#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    Text(String),
    Error(String),
    /// Metadata-only payload (usage, finish reason, safety ratings).
    Nothing,
}

pub(crate) fn parse_sse_data(data: &str) -> Result<SseEvent, serde_json::Error> {
    let resp: StreamResponse = serde_json::from_str(data)?;

    if let Some(error) = resp.error {
        return Ok(SseEvent::Error(match error.status {
            Some(status) => format!("{status}: {}", error.message),
            None => error.message,
        }));
    }

    let text: String = resp
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Ok(SseEvent::Nothing)
    } else {
        Ok(SseEvent::Text(text))
    }
}

type ChunkSender = tokio::sync::mpsc::Sender<Result<StreamChunk, ProviderError>>;

/// Split a raw SSE byte stream into `data:` lines and forward their text.
///
/// Lines are decoded only once complete, so a multi-byte character split
/// across network chunks survives intact. A line that is not UTF-8 or not
/// a valid response ends the stream with `MalformedResponse`.
pub(crate) async fn forward_sse<S, B, E>(byte_stream: S, tx: ChunkSender)
where
    S: futures::Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut byte_stream = std::pin::pin!(byte_stream);
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk_result) = byte_stream.next().await {
        let bytes = match chunk_result {
            Ok(b) => b,
            Err(e) => {
                let _ = tx
                    .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                    .await;
                return;
            }
        };

        buffer.extend_from_slice(bytes.as_ref());

        while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=line_end).collect();
            if !forward_line(&line[..line_end], &tx).await {
                return;
            }
        }
    }

    // A final line without a trailing newline.
    if !buffer.is_empty() && !forward_line(&buffer, &tx).await {
        return;
    }

    let _ = tx.send(Ok(StreamChunk::done())).await;
}

/// Handle one complete line. Returns `false` when the stream must stop.
async fn forward_line(raw: &[u8], tx: &ChunkSender) -> bool {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim_end_matches('\r'),
        Err(e) => {
            warn!(error = %e, "SSE line is not valid UTF-8");
            let _ = tx
                .send(Err(ProviderError::MalformedResponse(e.to_string())))
                .await;
            return false;
        }
    };

    let Some(data) = line.strip_prefix("data:") else {
        return true;
    };

    match parse_sse_data(data.trim()) {
        Ok(SseEvent::Text(text)) => tx.send(Ok(StreamChunk::text(text))).await.is_ok(),
        Ok(SseEvent::Error(message)) => {
            let _ = tx.send(Err(ProviderError::StreamInterrupted(message))).await;
            false
        }
        Ok(SseEvent::Nothing) => true,
        Err(e) => {
            warn!(data = %data, error = %e, "Unparseable SSE chunk");
            let _ = tx
                .send(Err(ProviderError::MalformedResponse(e.to_string())))
                .await;
            false
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let url = self.stream_url(&request.model);
        let body = Self::build_body(&request);

        debug!(model = %request.model, messages = request.messages.len(), "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status == 404 {
            return Err(ProviderError::ModelNotFound(request.model));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini streaming error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(forward_sse(response.bytes_stream(), tx));

        Ok(rx)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

// --- Gemini API response types ---

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}
