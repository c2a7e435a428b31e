//! Generative service providers for Groundwell.
//!
//! All providers implement the `groundwell_core::Provider` trait.
//! `build_from_config` selects and constructs the configured backend.

pub mod gemini;

pub use gemini::GeminiProvider;

use groundwell_config::AppConfig;
use groundwell_core::error::ProviderError;
use groundwell_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build the provider described by configuration.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(
                "no API key; set GROUNDWELL_API_KEY or api_key in config.toml".into(),
            )
        })?;

    let provider = GeminiProvider::new(
        &config.provider.api_url,
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )?;

    debug!(api_url = %config.provider.api_url, model = %config.model, "Provider configured");
    Ok(Arc::new(provider))
}
