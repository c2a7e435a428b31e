//! The application session: the single owner of persona, visitor,
//! language, memory and the two surfaces (text and live).
//!
//! There are no process-wide singletons. Everything the surfaces need is
//! held here and passed down by reference.

use std::sync::Arc;

use groundwell_core::message::Role;
use groundwell_core::persona::{PersonaDescriptor, UserProfile};
use groundwell_core::transport::LiveTransport;
use groundwell_memory::ConversationMemory;
use tracing::debug;

use crate::context::{InstructionAssembler, Language};
use crate::live::{LiveInputs, LiveSessionConfigurator};
use crate::session::{GenerationController, GenerationOutcome, GenerationRequest};
use crate::stream_event::GenerationEvent;

pub struct AppSession {
    persona: PersonaDescriptor,
    user: UserProfile,
    language: Language,
    augment: bool,
    assembler: InstructionAssembler,
    memory: ConversationMemory,
    controller: Arc<GenerationController>,
    live: Option<LiveSessionConfigurator>,
}

impl AppSession {
    pub fn new(
        controller: Arc<GenerationController>,
        memory: ConversationMemory,
        assembler: InstructionAssembler,
        persona: PersonaDescriptor,
    ) -> Self {
        Self {
            persona,
            user: UserProfile::default(),
            language: Language::default(),
            augment: true,
            assembler,
            memory,
            controller,
            live: None,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = user;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_augmentation(mut self, augment: bool) -> Self {
        self.augment = augment;
        self
    }

    /// Attach a live transport. The configurator starts from the session's
    /// current persona, visitor and language.
    pub fn attach_live(&mut self, transport: Arc<dyn LiveTransport>) -> &LiveSessionConfigurator {
        let configurator =
            LiveSessionConfigurator::new(transport, self.assembler.clone(), self.live_inputs());
        self.live.insert(configurator)
    }

    pub fn live(&self) -> Option<&LiveSessionConfigurator> {
        self.live.as_ref()
    }

    fn live_inputs(&self) -> LiveInputs {
        LiveInputs {
            persona: self.persona.clone(),
            user: self.user.clone(),
            language: self.language,
        }
    }

    pub fn persona(&self) -> &PersonaDescriptor {
        &self.persona
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn set_persona(&mut self, persona: PersonaDescriptor) {
        debug!(persona = %persona.id, "Persona changed");
        self.persona = persona;
        if let Some(live) = &self.live {
            live.set_persona(self.persona.clone());
        }
    }

    pub fn set_user(&mut self, user: UserProfile) {
        self.user = user;
        if let Some(live) = &self.live {
            live.set_user(self.user.clone());
        }
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        if let Some(live) = &self.live {
            live.set_language(language);
        }
    }

    pub fn set_augmentation(&mut self, augment: bool) {
        self.augment = augment;
    }

    /// The text-surface system instruction, with recalled memory.
    ///
    /// The text surface carries no language override; that belongs to the
    /// spoken session.
    pub fn system_instruction(&self) -> String {
        self.assembler
            .build_with_memory(&self.persona, &self.user, None, &self.memory.recall())
    }

    /// Run one text turn. Completed turns are remembered; failed and
    /// cancelled ones are not.
    ///
    /// The user turn and the answer are stored together once the answer
    /// completes. Memory order is therefore completion order; callers keep
    /// it chronological by awaiting one `ask` before starting the next. A
    /// new `ask` while one is in flight cancels the older one, so it never
    /// lands in memory out of order.
    pub async fn ask<F>(&self, input: &str, sink: F) -> Option<GenerationOutcome>
    where
        F: FnMut(&GenerationEvent) + Send,
    {
        let request = GenerationRequest::new(input, self.system_instruction())
            .with_augmentation(self.augment);
        let outcome = self.controller.run(request, sink).await?;

        if outcome.is_complete() {
            self.memory.remember(Role::User, input);
            self.memory.remember(Role::Model, &outcome.output);
        }
        Some(outcome)
    }

    /// Abandon the in-flight text request, if any.
    pub fn cancel(&self) {
        self.controller.cancel_active();
    }

    pub fn reset_memory(&self) {
        self.memory.forget();
    }

    /// Drive the live configurator one step, if attached.
    pub fn tick_live(&self) {
        if let Some(live) = &self.live {
            live.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaRegistry;
    use crate::test_helpers::{RecordingTransport, ScriptedProvider};
    use chrono::{TimeZone, Utc};
    use groundwell_core::clock::{Clock, FixedClock};
    use groundwell_core::error::ProviderError;
    use groundwell_core::persona::Voice;
    use groundwell_knowledge::KnowledgeBase;
    use groundwell_memory::InMemoryStore;

    fn session(provider: Arc<ScriptedProvider>) -> AppSession {
        let clock: Arc<dyn Clock> =
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()));
        let controller = GenerationController::new(
            provider,
            Arc::new(KnowledgeBase::builtin()),
            clock.clone(),
            "gemini-3-flash-preview",
        );
        let memory = ConversationMemory::new(Arc::new(InMemoryStore::new()), clock.clone());
        AppSession::new(
            Arc::new(controller),
            memory,
            InstructionAssembler::new(clock),
            PersonaRegistry::builtin().default_persona().clone(),
        )
    }

    #[tokio::test]
    async fn completed_turn_is_remembered_and_recalled() {
        let provider = Arc::new(ScriptedProvider::new(&["He builds ", "RAG systems."]));
        let app = session(provider.clone());

        app.ask("what projects has he built", |_| {}).await.unwrap();
        assert_eq!(
            app.memory().recall(),
            "User: what projects has he built\nAI: He builds RAG systems."
        );

        app.ask("and trading?", |_| {}).await.unwrap();
        let instruction = provider.last_request().system_instruction.unwrap();
        assert!(instruction.contains("RECENT CONVERSATION"));
        assert!(instruction.contains("AI: He builds RAG systems."));
        assert!(!instruction.contains("IMPORTANT OVERRIDE"));
    }

    #[tokio::test]
    async fn failed_turn_is_not_remembered() {
        let provider = Arc::new(ScriptedProvider::failing_after(
            &["half"],
            ProviderError::Network("reset".into()),
        ));
        let app = session(provider);
        let outcome = app.ask("hello", |_| {}).await.unwrap();
        assert!(!outcome.is_complete());
        assert_eq!(app.memory().recall(), "");
    }

    #[tokio::test]
    async fn reset_memory_forgets() {
        let app = session(Arc::new(ScriptedProvider::new(&["ok"])));
        app.ask("hi", |_| {}).await.unwrap();
        app.reset_memory();
        assert_eq!(app.memory().recall(), "");
    }

    #[tokio::test]
    async fn augmentation_toggle_reaches_controller() {
        let provider = Arc::new(ScriptedProvider::new(&["ok"]));
        let app = session(provider.clone()).with_augmentation(false);
        let outcome = app.ask("plain", |_| {}).await.unwrap();
        assert_eq!(outcome.prompt, "plain");
    }

    #[test]
    fn setters_feed_live_configurator() {
        let transport = Arc::new(RecordingTransport::new());
        let mut app = session(Arc::new(ScriptedProvider::new(&[])));
        app.attach_live(transport.clone());
        app.tick_live();
        assert_eq!(transport.config_count(), 1);

        let mut persona = app.persona().clone();
        persona.voice = Voice::Charon;
        app.set_persona(persona);
        app.set_language(Language::English);
        app.set_user(UserProfile {
            name: Some("Mali".into()),
            info: None,
        });
        app.tick_live();

        assert_eq!(transport.config_count(), 2);
        let config = transport.last_config().unwrap();
        assert_eq!(config.voice, Voice::Charon);
        assert!(config.system_instruction.contains("visitor named Mali"));
        assert!(config.system_instruction.ends_with(Language::English.override_block()));
    }
}
