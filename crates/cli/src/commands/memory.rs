//! `groundwell memory`: inspect or clear conversational memory.

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let memory = super::memory(&config, super::clock(&config));

    println!("Conversational Memory");
    println!("=====================");
    println!("  Backend:  {}", memory.store_name());
    if config.memory.backend == "file" {
        println!("  File:     {}", config.memory.resolved_path().display());
    }
    println!("  Key:      {}", config.memory.key);
    println!("  Capacity: {} turns", memory.capacity());
    println!();

    let entries = memory.entries();
    if entries.is_empty() {
        println!("  (nothing remembered)");
        return Ok(());
    }

    for entry in &entries {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".into());
        println!("  [{when}] {}: {}", entry.role.transcript_label(), entry.text);
    }
    Ok(())
}

pub fn clear(confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("This forgets every remembered turn. Re-run with --confirm to proceed.");
        return Ok(());
    }

    let config = super::load_config()?;
    let memory = super::memory(&config, super::clock(&config));
    let count = memory.entries().len();
    memory.forget();
    println!("Forgot {count} remembered turn(s).");
    Ok(())
}
