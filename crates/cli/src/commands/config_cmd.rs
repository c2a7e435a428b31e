//! `groundwell config`: configuration commands.

use groundwell_config::AppConfig;

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!("{}", render_redacted(&config)?);
    Ok(())
}

/// TOML rendering with the API key masked.
fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&shown)
}
