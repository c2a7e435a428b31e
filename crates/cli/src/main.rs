//! Groundwell CLI: the main entry point.
//!
//! Commands:
//! - `init`      Write a default config file
//! - `ask`       Stream one grounded answer
//! - `chat`      Interactive grounded chat with short-term memory
//! - `retrieve`  Show the knowledge context a query would get
//! - `prompt`    Print the assembled system instruction
//! - `live`      Dry-run the live session configurator
//! - `memory`    Inspect or clear conversational memory
//! - `config`    Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "groundwell",
    about = "Groundwell: a persona-grounded, knowledge-augmented assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Ask one question and stream the answer
    Ask {
        /// The question
        message: String,

        /// Send the raw question without knowledge context
        #[arg(long)]
        no_rag: bool,
    },

    /// Interactive chat (type /reset to forget, exit to quit)
    Chat {
        /// Send raw questions without knowledge context
        #[arg(long)]
        no_rag: bool,
    },

    /// Show which knowledge sections a query matches
    Retrieve {
        /// The query
        query: String,
    },

    /// Print the assembled system instruction
    Prompt {
        /// Append a language override (th or en)
        #[arg(short, long)]
        language: Option<String>,

        /// Visitor name to address
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Dry-run the live session configurator against a console transport
    Live {
        /// Spoken language (th or en)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Conversational memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Print remembered turns
    Show,

    /// Forget all remembered turns
    Clear {
        /// Required to actually clear
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (API key redacted)
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { force } => commands::init::run(force)?,
        Commands::Ask { message, no_rag } => commands::ask::run(&message, !no_rag).await?,
        Commands::Chat { no_rag } => commands::chat::run(!no_rag).await?,
        Commands::Retrieve { query } => commands::retrieve::run(&query)?,
        Commands::Prompt { language, user } => {
            commands::prompt::run(language.as_deref(), user.as_deref())?
        }
        Commands::Live { language } => commands::live::run(language.as_deref())?,
        Commands::Memory { action } => match action {
            MemoryAction::Show => commands::memory::show()?,
            MemoryAction::Clear { confirm } => commands::memory::clear(confirm)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
        },
    }

    Ok(())
}
