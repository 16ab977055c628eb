//! twentyq - twenty-questions guessing game
//!
//! Terminal front-end over the twentyq engine.

mod commands;
mod display;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "twentyq")]
#[command(about = "Think of a person, answer yes/no, and let twentyq guess", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (overrides $TWENTYQ_CONFIG and the default locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Candidate database (overrides database.path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Skip oracle discovery and play with the built-in heuristics only
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game
    Play,

    /// Run one turn: JSON request on stdin, JSON outcome on stdout
    Turn,

    /// Show which oracle backend is in use
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the people in the database
    People,

    /// List the questions in the database
    Questions,

    /// Write the seed database
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging() {
    let filter = std::env::var("TWENTYQ_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.db, cli.offline)?;

    match cli.command {
        Commands::Play => commands::play(&config),
        Commands::Turn => commands::turn(&config),
        Commands::Status { json } => commands::status(&config, json),
        Commands::People => commands::people(&config),
        Commands::Questions => commands::questions(&config),
        Commands::Init { force } => commands::init(&config, force),
    }
}
