//! The generation session controller (text mode).
//!
//! One call to [`GenerationController::run`] drives one request through
//! `Idle → Ingest → Retrieval → Inference → Streaming → Complete`:
//!
//! 1. **Ingest**: reject blank input, start a fresh output buffer and clock
//! 2. **Retrieval**: fetch knowledge context when augmentation is on
//! 3. **Inference**: send prompt plus system instruction to the provider
//! 4. **Streaming**: each chunk is appended and surfaced immediately
//! 5. **Complete**: stream ended, latency recorded
//!
//! Any provider failure moves to `Error`, appends the fixed user-facing
//! message to whatever streamed so far, and does not retry.
//!
//! Starting a request cancels the previous one. A cancelled request stops
//! at the next chunk boundary (or while waiting for one) and emits nothing
//! further.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use groundwell_core::clock::Clock;
use groundwell_core::error::ProviderError;
use groundwell_core::event::{DomainEvent, EventBus};
use groundwell_core::message::Message;
use groundwell_core::provider::{Provider, ProviderRequest};
use groundwell_knowledge::KnowledgeBase;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::context::build_prompt;
use crate::stream_event::GenerationEvent;
use crate::trace::{RequestTrace, Stage};

/// Shown in place of an answer when generation fails.
pub const ERROR_MESSAGE: &str = "Error: Could not generate response. Check API configuration.";

/// Cooperative cancellation shared between a request and whoever started it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel is not missed.
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    fn same_as(&self, other: &CancelFlag) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// One submission.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub input: String,
    pub system_instruction: String,
    /// Retrieval augmentation toggle.
    pub augment: bool,
}

impl GenerationRequest {
    pub fn new(input: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            system_instruction: system_instruction.into(),
            augment: true,
        }
    }

    pub fn with_augmentation(mut self, augment: bool) -> Self {
        self.augment = augment;
        self
    }
}

/// How a request ended.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub request_id: String,
    /// Final stage: `Complete`, `Error`, or wherever a cancel stopped it.
    pub stage: Stage,
    pub trace: RequestTrace,
    /// Streamed text; on failure, partial text followed by [`ERROR_MESSAGE`].
    pub output: String,
    /// Milliseconds from Ingest to Complete. `None` unless complete.
    pub latency_ms: Option<u64>,
    /// The user prompt actually sent.
    pub prompt: String,
    pub error: Option<ProviderError>,
    pub cancelled: bool,
}

impl GenerationOutcome {
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete && !self.cancelled
    }
}

/// Drives single generation requests against a provider.
pub struct GenerationController {
    provider: Arc<dyn Provider>,
    knowledge: Arc<KnowledgeBase>,
    clock: Arc<dyn Clock>,
    model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
    event_bus: Option<Arc<EventBus>>,
    active: Mutex<Option<CancelFlag>>,
}

enum StreamEnd {
    Complete,
    Failed(ProviderError),
    Cancelled,
}

impl GenerationController {
    pub fn new(
        provider: Arc<dyn Provider>,
        knowledge: Arc<KnowledgeBase>,
        clock: Arc<dyn Clock>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            knowledge,
            clock,
            model: model.into(),
            temperature: 0.7,
            max_output_tokens: None,
            event_bus: None,
            active: Mutex::new(None),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Cancel whatever request is in flight.
    pub fn cancel_active(&self) {
        if let Some(flag) = self.active_slot().take() {
            flag.cancel();
        }
    }

    fn active_slot(&self) -> std::sync::MutexGuard<'_, Option<CancelFlag>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start tracking a new request, cancelling the previous one.
    fn begin(&self) -> CancelFlag {
        let flag = CancelFlag::new();
        if let Some(previous) = self.active_slot().replace(flag.clone()) {
            debug!("Superseding in-flight request");
            previous.cancel();
        }
        flag
    }

    fn finish(&self, flag: &CancelFlag) {
        let mut slot = self.active_slot();
        if slot.as_ref().is_some_and(|f| f.same_as(flag)) {
            *slot = None;
        }
    }

    /// Run one request, surfacing events to `sink` as they happen.
    ///
    /// Returns `None` for blank input: nothing starts and the stage stays
    /// `Idle`.
    pub async fn run<F>(&self, request: GenerationRequest, mut sink: F) -> Option<GenerationOutcome>
    where
        F: FnMut(&GenerationEvent) + Send,
    {
        if request.input.trim().is_empty() {
            return None;
        }

        let flag = self.begin();
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut trace = RequestTrace::new();
        let mut output = String::new();

        // ── Ingest ──
        self.enter(&mut trace, Stage::Ingest, &request_id, &mut sink);
        let started_ms = self.clock.now_millis();

        // ── Retrieval ──
        self.enter(&mut trace, Stage::Retrieval, &request_id, &mut sink);
        let prompt = if request.augment {
            let context = self.knowledge.retrieve(&request.input);
            build_prompt(&request.input, Some(&context))
        } else {
            build_prompt(&request.input, None)
        };

        // ── Inference ──
        self.enter(&mut trace, Stage::Inference, &request_id, &mut sink);
        info!(request_id = %request_id, model = %self.model, augment = request.augment, "Generation started");

        let provider_request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt.clone())],
            system_instruction: Some(request.system_instruction.clone()),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        let end = match self.provider.stream(provider_request).await {
            Err(e) => {
                if flag.is_cancelled() {
                    StreamEnd::Cancelled
                } else {
                    StreamEnd::Failed(e)
                }
            }
            Ok(mut rx) => loop {
                if flag.is_cancelled() {
                    break StreamEnd::Cancelled;
                }

                let item = tokio::select! {
                    biased;
                    _ = flag.cancelled() => break StreamEnd::Cancelled,
                    item = rx.recv() => item,
                };

                match item {
                    Some(Ok(chunk)) => {
                        if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
                            // ── Streaming ──
                            self.enter(&mut trace, Stage::Streaming, &request_id, &mut sink);
                            output.push_str(&content);
                            sink(&GenerationEvent::Chunk { content });
                        }
                        if chunk.done {
                            break StreamEnd::Complete;
                        }
                    }
                    Some(Err(e)) => break StreamEnd::Failed(e),
                    None => break StreamEnd::Complete,
                }
            },
        };

        let mut outcome = GenerationOutcome {
            request_id: request_id.clone(),
            stage: trace.current(),
            trace: trace.clone(),
            output,
            latency_ms: None,
            prompt,
            error: None,
            cancelled: false,
        };

        match end {
            StreamEnd::Complete => {
                self.enter(&mut trace, Stage::Complete, &request_id, &mut sink);
                let latency_ms = (self.clock.now_millis() - started_ms).max(0) as u64;
                sink(&GenerationEvent::Done { latency_ms });
                info!(request_id = %request_id, latency_ms, chars = outcome.output.len(), "Generation complete");
                self.publish(DomainEvent::GenerationCompleted {
                    request_id: request_id.clone(),
                    latency_ms,
                    output_chars: outcome.output.chars().count(),
                    timestamp: self.clock.now(),
                });
                outcome.latency_ms = Some(latency_ms);
            }
            StreamEnd::Failed(e) => {
                self.enter(&mut trace, Stage::Error, &request_id, &mut sink);
                warn!(request_id = %request_id, error = %e, "Generation failed");
                outcome.output.push_str(ERROR_MESSAGE);
                sink(&GenerationEvent::Error {
                    message: ERROR_MESSAGE.into(),
                });
                self.publish(DomainEvent::GenerationFailed {
                    request_id: request_id.clone(),
                    error_message: e.to_string(),
                    timestamp: self.clock.now(),
                });
                outcome.error = Some(e);
            }
            StreamEnd::Cancelled => {
                debug!(request_id = %request_id, stage = %trace.current(), "Generation cancelled");
                outcome.cancelled = true;
            }
        }

        self.finish(&flag);
        outcome.stage = trace.current();
        outcome.trace = trace;
        Some(outcome)
    }

    fn enter<F>(&self, trace: &mut RequestTrace, stage: Stage, request_id: &str, sink: &mut F)
    where
        F: FnMut(&GenerationEvent),
    {
        let changed = trace.current() != stage;
        if let Err(e) = trace.advance(stage) {
            warn!(request_id, error = %e, "Ignoring illegal stage transition");
            return;
        }
        if changed {
            sink(&GenerationEvent::Stage { stage });
            self.publish(DomainEvent::StageAdvanced {
                request_id: request_id.to_string(),
                stage: stage.label().to_string(),
                timestamp: self.clock.now(),
            });
        }
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
