//! `groundwell live`: dry-run the live session configurator.
//!
//! A console transport stands in for the duplex audio session. It prints
//! every configuration push and every sent turn, and is flipped to
//! connected once so the greeting fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use groundwell_agent::{InstructionAssembler, LiveInputs, LiveSessionConfigurator, PersonaRegistry};
use groundwell_core::error::TransportError;
use groundwell_core::transport::{LiveConfig, LivePayload, LiveTransport};

/// Prints what a real transport would receive.
#[derive(Default)]
pub struct ConsoleTransport {
    connected: AtomicBool,
}

impl ConsoleTransport {
    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        println!("  [transport] connected");
    }
}

impl LiveTransport for ConsoleTransport {
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
        match payload.as_text() {
            Some(text) => println!("  [transport] send (end_of_turn={end_of_turn}): {text}"),
            None => println!("  [transport] send audio (end_of_turn={end_of_turn})"),
        }
        Ok(())
    }

    fn push_config(&self, config: LiveConfig) -> Result<(), TransportError> {
        let rendered = serde_json::to_string_pretty(&config)
            .map_err(|e| TransportError::Rejected(e.to_string()))?;
        println!("  [transport] config pushed:");
        println!("{rendered}");
        Ok(())
    }
}

pub fn run(language: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let clock = super::clock(&config);
    let personas = PersonaRegistry::from_config(&config.personas)?;

    let inputs = LiveInputs {
        persona: personas.resolve(&config.session.persona).clone(),
        user: super::user_profile(&config),
        language: super::language(&config, language)?,
    };

    println!();
    println!("  Live model: {}", config.live_model);
    println!("  Voice:      {}", inputs.persona.voice);
    println!("  Language:   {}", inputs.language);
    println!();

    let transport = Arc::new(ConsoleTransport::default());
    let live = LiveSessionConfigurator::new(
        transport.clone(),
        InstructionAssembler::new(clock),
        inputs,
    );

    live.tick();
    transport.connect();
    live.tick();
    // Still connected, so no second greeting.
    live.tick();

    println!();
    println!("  Pushed {} configuration(s).", live.revision());
    Ok(())
}
