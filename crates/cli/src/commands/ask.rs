//! `groundwell ask`: stream one grounded answer.

use std::io::Write;

use groundwell_agent::GenerationEvent;

pub async fn run(message: &str, augment: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let app = super::build_session(&config, augment)?;

    let Some(outcome) = app.ask(message, print_event).await else {
        return Err("Nothing to ask: the message is empty.".into());
    };
    println!();

    match outcome.latency_ms {
        Some(ms) => eprintln!("  ({} · {ms} ms)", outcome.stage),
        None => eprintln!("  ({})", outcome.stage),
    }
    Ok(())
}

/// Print streamed text as it arrives. Shared with `chat`.
pub(crate) fn print_event(event: &GenerationEvent) {
    match event {
        GenerationEvent::Chunk { content } => {
            print!("{content}");
            let _ = std::io::stdout().flush();
        }
        GenerationEvent::Error { message } => {
            println!();
            eprintln!("  [Error] {message}");
        }
        GenerationEvent::Stage { .. } | GenerationEvent::Done { .. } => {}
    }
}
