//! Shared test doubles for controller, configurator and session tests.

use groundwell_core::error::{ProviderError, TransportError};
use groundwell_core::provider::{ChunkReceiver, Provider, ProviderRequest, StreamChunk};
use groundwell_core::transport::{LiveConfig, LivePayload, LiveTransport};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// A provider that streams a fixed chunk script.
///
/// Optionally fails after the script, or holds the stream open so the
/// consumer waits forever for the next chunk.
pub struct ScriptedProvider {
    chunks: Vec<String>,
    fail_with: Option<ProviderError>,
    reject_with: Option<ProviderError>,
    hold_open: bool,
    follow_up: Option<Vec<String>>,
    held: Mutex<Vec<mpsc::Sender<Result<StreamChunk, ProviderError>>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            fail_with: None,
            reject_with: None,
            hold_open: false,
            follow_up: None,
            held: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stream the chunks, then an error item.
    pub fn failing_after(chunks: &[&str], error: ProviderError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(chunks)
        }
    }

    /// Refuse the call before any stream exists.
    pub fn rejecting(error: ProviderError) -> Self {
        Self {
            reject_with: Some(error),
            ..Self::new(&[])
        }
    }

    /// Stream the chunks, then never finish.
    pub fn stalling_after(chunks: &[&str]) -> Self {
        Self {
            hold_open: true,
            ..Self::new(chunks)
        }
    }

    /// Stall the first call after `first`; later calls stream `then` and finish.
    pub fn stalling_once(first: &[&str], then: &[&str]) -> Self {
        Self {
            hold_open: true,
            follow_up: Some(then.iter().map(|c| c.to_string()).collect()),
            ..Self::new(first)
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ProviderRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        if let Some(error) = &self.reject_with {
            return Err(error.clone());
        }

        let (chunks, hold_open) = match &self.follow_up {
            Some(then) if call > 1 => (then, false),
            _ => (&self.chunks, self.hold_open),
        };

        let (tx, rx) = mpsc::channel(chunks.len() + 2);
        for chunk in chunks {
            tx.send(Ok(StreamChunk::text(chunk.clone()))).await.unwrap();
        }

        if let Some(error) = &self.fail_with {
            tx.send(Err(error.clone())).await.unwrap();
        } else if hold_open {
            self.held.lock().unwrap().push(tx);
        } else {
            tx.send(Ok(StreamChunk::done())).await.unwrap();
        }

        Ok(rx)
    }
}

/// A transport that records everything pushed or sent into it.
#[derive(Default)]
pub struct RecordingTransport {
    connected: AtomicBool,
    refuse_push: AtomicBool,
    pub configs: Mutex<Vec<LiveConfig>>,
    pub sent: Mutex<Vec<(LivePayload, bool)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn refuse_pushes(&self) {
        self.refuse_push.store(true, Ordering::SeqCst);
    }

    pub fn config_count(&self) -> usize {
        self.configs.lock().unwrap().len()
    }

    pub fn last_config(&self) -> Option<LiveConfig> {
        self.configs.lock().unwrap().last().cloned()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(p, _)| p.as_text().map(str::to_string))
            .collect()
    }
}

impl LiveTransport for RecordingTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn volume(&self) -> f32 {
        0.0
    }

    fn send(&self, payload: LivePayload, end_of_turn: bool) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.sent.lock().unwrap().push((payload, end_of_turn));
        Ok(())
    }

    fn push_config(&self, config: LiveConfig) -> Result<(), TransportError> {
        if self.refuse_push.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected("config slot locked".into()));
        }
        self.configs.lock().unwrap().push(config);
        Ok(())
    }
}
