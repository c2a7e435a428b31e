//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod init;
pub mod live;
pub mod memory;
pub mod prompt;
pub mod retrieve;

use std::sync::Arc;

use groundwell_agent::{
    AppSession, GenerationController, InstructionAssembler, Language, PersonaRegistry,
};
use groundwell_config::AppConfig;
use groundwell_core::clock::{Clock, SystemClock};
use groundwell_core::event::EventBus;
use groundwell_core::persona::UserProfile;
use groundwell_core::store::KeyValueStore;
use groundwell_knowledge::KnowledgeBase;
use groundwell_memory::{ConversationMemory, FileStore, InMemoryStore, NoopStore};

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

pub(crate) fn load_config() -> CmdResult<AppConfig> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub(crate) fn clock(config: &AppConfig) -> Arc<dyn Clock> {
    Arc::new(SystemClock::from_locale_name(&config.session.locale))
}

pub(crate) fn knowledge(config: &AppConfig) -> CmdResult<KnowledgeBase> {
    match &config.knowledge.path {
        Some(path) => Ok(KnowledgeBase::load_from(path)?),
        None => Ok(KnowledgeBase::builtin()),
    }
}

pub(crate) fn store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match config.memory.backend.as_str() {
        "in_memory" => Arc::new(InMemoryStore::new()),
        "none" => Arc::new(NoopStore),
        _ => Arc::new(FileStore::new(config.memory.resolved_path())),
    }
}

pub(crate) fn memory(config: &AppConfig, clock: Arc<dyn Clock>) -> ConversationMemory {
    ConversationMemory::new(store(config), clock)
        .with_key(config.memory.key.clone())
        .with_capacity(config.memory.capacity)
}

pub(crate) fn user_profile(config: &AppConfig) -> UserProfile {
    UserProfile {
        name: config.user.name.clone(),
        info: config.user.info.clone(),
    }
}

pub(crate) fn language(config: &AppConfig, flag: Option<&str>) -> CmdResult<Language> {
    let raw = flag.unwrap_or(&config.session.language);
    Ok(raw.parse::<Language>()?)
}

/// Wire a text session from configuration. Fails early without an API key.
pub(crate) fn build_session(config: &AppConfig, augment: bool) -> CmdResult<AppSession> {
    if !config.has_api_key() {
        print_api_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let clock = clock(config);
    let events = Arc::new(EventBus::default());
    let provider = groundwell_providers::build_from_config(config)?;
    let personas = PersonaRegistry::from_config(&config.personas)?;

    let controller = GenerationController::new(
        provider,
        Arc::new(knowledge(config)?),
        clock.clone(),
        config.model.clone(),
    )
    .with_temperature(config.temperature)
    .with_max_output_tokens(config.max_output_tokens)
    .with_event_bus(events.clone());

    let memory = memory(config, clock.clone()).with_events(events);

    Ok(AppSession::new(
        Arc::new(controller),
        memory,
        InstructionAssembler::new(clock),
        personas.resolve(&config.session.persona).clone(),
    )
    .with_user(user_profile(config))
    .with_language(language(config, None)?)
    .with_augmentation(augment && config.generation.rag_enabled))
}

fn print_api_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export GROUNDWELL_API_KEY='...'");
    eprintln!("    export GEMINI_API_KEY='...'");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}
