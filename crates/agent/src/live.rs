//! Live session configurator (voice mode).
//!
//! Modeled as an explicit observer rather than effectful watchers:
//!
//! - a dependency set ([`LiveInputs`]: persona, visitor, language),
//! - a pure recompute ([`LiveSessionConfigurator::recompute`]),
//! - an explicit apply step that pushes at most one configuration.
//!
//! Several updates before an apply collapse into a single push of the
//! newest inputs, so a stale configuration is never pushed after a newer one.
//!
//! Separately, the configurator watches the transport's connected signal
//! and sends one scripted greeting per not-connected → connected edge.

use std::sync::{Arc, Mutex, MutexGuard};

use groundwell_core::event::{DomainEvent, EventBus};
use groundwell_core::persona::{PersonaDescriptor, UserProfile};
use groundwell_core::transport::{LiveConfig, LivePayload, LiveTransport, ResponseModality};
use tracing::{debug, info, warn};

use crate::context::{InstructionAssembler, Language};

/// The watched dependency set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveInputs {
    pub persona: PersonaDescriptor,
    pub user: UserProfile,
    pub language: Language,
}

struct LiveState {
    inputs: LiveInputs,
    dirty: bool,
    revision: u64,
    last_pushed: Option<LiveConfig>,
    connected: bool,
}

pub struct LiveSessionConfigurator {
    transport: Arc<dyn LiveTransport>,
    assembler: InstructionAssembler,
    event_bus: Option<Arc<EventBus>>,
    state: Mutex<LiveState>,
}

impl LiveSessionConfigurator {
    /// The initial inputs count as a change; the first `apply` pushes them.
    pub fn new(
        transport: Arc<dyn LiveTransport>,
        assembler: InstructionAssembler,
        inputs: LiveInputs,
    ) -> Self {
        Self {
            transport,
            assembler,
            event_bus: None,
            state: Mutex::new(LiveState {
                inputs,
                dirty: true,
                revision: 0,
                last_pushed: None,
                connected: false,
            }),
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn state(&self) -> MutexGuard<'_, LiveState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the whole dependency set.
    pub fn update(&self, inputs: LiveInputs) {
        let mut state = self.state();
        state.inputs = inputs;
        state.dirty = true;
    }

    pub fn set_persona(&self, persona: PersonaDescriptor) {
        let mut state = self.state();
        state.inputs.persona = persona;
        state.dirty = true;
    }

    pub fn set_user(&self, user: UserProfile) {
        let mut state = self.state();
        state.inputs.user = user;
        state.dirty = true;
    }

    pub fn set_language(&self, language: Language) {
        let mut state = self.state();
        state.inputs.language = language;
        state.dirty = true;
    }

    pub fn inputs(&self) -> LiveInputs {
        self.state().inputs.clone()
    }

    /// Compute the configuration for a dependency set. No side effects.
    pub fn recompute(&self, inputs: &LiveInputs) -> LiveConfig {
        LiveConfig {
            response_modality: ResponseModality::Audio,
            voice: inputs.persona.voice,
            system_instruction: self.assembler.build_system_instruction(
                &inputs.persona,
                &inputs.user,
                Some(inputs.language),
            ),
        }
    }

    /// Push the newest configuration if anything changed since the last
    /// apply. Returns the pushed configuration.
    pub fn apply(&self) -> Option<LiveConfig> {
        let mut state = self.state();
        if !state.dirty {
            return None;
        }
        state.dirty = false;

        let config = self.recompute(&state.inputs);
        match self.transport.push_config(config.clone()) {
            Ok(()) => {
                state.revision += 1;
                state.last_pushed = Some(config.clone());
                debug!(revision = state.revision, voice = %config.voice, language = %state.inputs.language, "Live config pushed");
                self.publish(DomainEvent::LiveConfigPushed {
                    revision: state.revision,
                    timestamp: self.assembler.clock().now(),
                });
                Some(config)
            }
            Err(e) => {
                warn!(error = %e, "Live transport refused configuration");
                None
            }
        }
    }

    /// Feed the transport's connected signal. Sends the greeting on a
    /// not-connected → connected edge and returns whether it did.
    pub fn on_connection_state(&self, connected: bool) -> bool {
        let mut state = self.state();
        let rising = connected && !state.connected;
        state.connected = connected;
        if !rising {
            return false;
        }

        let language = state.inputs.language;
        drop(state);

        info!(language = %language, "Live session connected, sending greeting");
        match self.transport.send(LivePayload::text(language.greeting()), true) {
            Ok(()) => {
                self.publish(DomainEvent::GreetingSent {
                    language: language.code().to_string(),
                    timestamp: self.assembler.clock().now(),
                });
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to send greeting");
                false
            }
        }
    }

    /// One reactive step: apply pending changes, then sample the
    /// connected signal.
    pub fn tick(&self) {
        self.apply();
        self.on_connection_state(self.transport.is_connected());
    }

    pub fn revision(&self) -> u64 {
        self.state().revision
    }

    pub fn last_pushed(&self) -> Option<LiveConfig> {
        self.state().last_pushed.clone()
    }

    /// Output volume reported by the transport.
    pub fn volume(&self) -> f32 {
        self.transport.volume()
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
