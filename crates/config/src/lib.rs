//! Configuration loading, validation, and management for Groundwell.
//!
//! Loads configuration from `~/.groundwell/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Memory never keeps more turns than this.
pub const MAX_MEMORY_CAPACITY: usize = 10;

/// The root configuration structure.
///
/// Maps directly to `~/.groundwell/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generative service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for streamed text generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used for the duplex voice session
    #[serde(default = "default_live_model")]
    pub live_model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional cap on generated tokens per response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Remote endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Text generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Conversational memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Active persona, language, and locale
    #[serde(default)]
    pub session: SessionConfig,

    /// Default visitor profile
    #[serde(default)]
    pub user: UserConfig,

    /// Extra personas added to the built-in registry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<PersonaConfig>,

    /// Knowledge table source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

fn default_model() -> String {
    "gemini-3-flash-preview".into()
}
fn default_live_model() -> String {
    "gemini-2.5-flash-native-audio-preview-09-2025".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("live_model", &self.live_model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("provider", &self.provider)
            .field("generation", &self.generation)
            .field("memory", &self.memory)
            .field("session", &self.session)
            .field("user", &self.user)
            .field("personas", &self.personas)
            .field("knowledge", &self.knowledge)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Inject retrieved knowledge into the prompt
    #[serde(default = "default_true")]
    pub rag_enabled: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { rag_enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "file", "in_memory", or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Store file for the "file" backend (default: ~/.groundwell/memory/store.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Namespaced key the transcript lives under
    #[serde(default = "default_memory_key")]
    pub key: String,

    /// Maximum remembered turns (1..=10)
    #[serde(default = "default_memory_capacity")]
    pub capacity: usize,
}

fn default_memory_backend() -> String {
    "file".into()
}
fn default_memory_key() -> String {
    "ai_short_term_memory".into()
}
fn default_memory_capacity() -> usize {
    MAX_MEMORY_CAPACITY
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: None,
            key: default_memory_key(),
            capacity: default_memory_capacity(),
        }
    }
}

impl MemoryConfig {
    /// The store file, falling back to the default location.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("memory").join("store.json"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Persona id looked up in the registry
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Spoken-language mode: "th" or "en"
    #[serde(default = "default_language")]
    pub language: String,

    /// POSIX locale used for the date line (e.g. "en_US", "th_TH")
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_persona() -> String {
    "watcharapon-ai".into()
}
fn default_language() -> String {
    "th".into()
}
fn default_locale() -> String {
    "en_US".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            language: default_language(),
            locale: default_locale(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: Some("Visitor".into()),
            info: Some("A professional evaluating the engineering portfolio.".into()),
        }
    }
}

/// A persona defined in config, merged into the built-in registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub id: String,
    pub name: String,
    pub personality: String,

    /// Prebuilt voice name (e.g. "Fenrir")
    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default = "default_color")]
    pub color: String,
}

fn default_voice() -> String {
    "Fenrir".into()
}
fn default_color() -> String {
    "#2563eb".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// TOML knowledge table replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.groundwell/config.toml).
    ///
    /// Also checks environment variables:
    /// - `GROUNDWELL_API_KEY` (highest priority), then `GEMINI_API_KEY`
    /// - `GROUNDWELL_MODEL`
    /// - `GROUNDWELL_LANGUAGE`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = var("GROUNDWELL_API_KEY").or_else(|| var("GEMINI_API_KEY"));
        }

        if let Some(model) = var("GROUNDWELL_MODEL") {
            self.model = model;
        }

        if let Some(language) = var("GROUNDWELL_LANGUAGE") {
            self.session.language = language;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".groundwell")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.capacity == 0 || self.memory.capacity > MAX_MEMORY_CAPACITY {
            return Err(ConfigError::ValidationError(format!(
                "memory.capacity must be between 1 and {MAX_MEMORY_CAPACITY}"
            )));
        }

        if !matches!(self.memory.backend.as_str(), "file" | "in_memory" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "unknown memory.backend '{}' (expected file, in_memory, or none)",
                self.memory.backend
            )));
        }

        if self.memory.key.trim().is_empty() {
            return Err(ConfigError::ValidationError("memory.key must not be empty".into()));
        }

        if !matches!(self.session.language.as_str(), "th" | "en") {
            return Err(ConfigError::ValidationError(format!(
                "unknown session.language '{}' (expected th or en)",
                self.session.language
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            live_model: default_live_model(),
            temperature: default_temperature(),
            max_output_tokens: None,
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
            memory: MemoryConfig::default(),
            session: SessionConfig::default(),
            user: UserConfig::default(),
            personas: vec![],
            knowledge: KnowledgeConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
