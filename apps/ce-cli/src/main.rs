//! # ce-cli
//!
//! Command-line interface for the challenge editor.
//!
//! - `ce validate` — report the required fields a record is missing
//! - `ce payload` — print the payload that would be persisted
//! - `ce launch` — run the confirm-then-submit flow against the API

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ce_editor::{EditorConfig, DEFAULT_CONFIG_PATH};

/// Challenge editor CLI — validate, project and launch challenge records.
#[derive(Parser)]
#[command(name = "ce", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Editor config file (defaults to `.ce/editor.toml` under the project root).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a challenge record against the required fields.
    Validate {
        /// Challenge record (JSON).
        challenge: PathBuf,
    },
    /// Print the persistable projection of a challenge record.
    Payload(commands::payload::PayloadArgs),
    /// Confirm and submit a challenge as active.
    Launch(commands::launch::LaunchArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ce_editor=info".parse()?)
                .add_directive("ce_api=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_or_default(&project_root.join(DEFAULT_CONFIG_PATH)),
    };

    match &cli.command {
        Commands::Validate { challenge } => commands::validate::execute(challenge),
        Commands::Payload(args) => commands::payload::execute(args, &config),
        Commands::Launch(args) => commands::launch::execute(args, &config, &project_root),
    }
}
