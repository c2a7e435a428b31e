//! `groundwell chat`: interactive grounded chat with short-term memory.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::ask::print_event;

pub async fn run(augment: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let app = super::build_session(&config, augment)?;

    println!();
    println!("  Groundwell: Interactive Mode");
    println!("  ============================");
    println!();
    println!("  Persona:   {}", app.persona().name);
    println!("  Model:     {}", config.model);
    println!("  Memory:    {} ({} turns)", app.memory().store_name(), app.memory().capacity());
    println!("  Knowledge: {}", if augment && config.generation.rag_enabled { "on" } else { "off" });
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/reset' to forget the conversation, 'exit' to quit.");
    println!("  Ctrl+C abandons the answer in progress.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "exit" | "quit" => break,
            "/reset" => {
                app.reset_memory();
                println!("  Memory cleared.");
                println!();
                continue;
            }
            _ => {}
        }

        print!("  {} > ", app.persona().name);
        std::io::stdout().flush()?;

        tokio::select! {
            outcome = app.ask(input, print_event) => {
                println!();
                if let Some(ms) = outcome.and_then(|o| o.latency_ms) {
                    tracing::debug!(latency_ms = ms, "Answer complete");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                app.cancel();
                println!();
                println!("  [cancelled]");
            }
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
