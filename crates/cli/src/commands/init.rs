//! `groundwell init`: first-time setup.

use groundwell_config::AppConfig;

pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Groundwell: First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("Edit it manually, or re-run with --force to overwrite.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Wrote config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. export GEMINI_API_KEY='...' (or set api_key in the file)");
    println!("  2. groundwell ask \"What projects has he built?\"");
    println!("  3. groundwell chat");
    Ok(())
}
