//! Submission Archiver CLI
//!
//! Local execution entry point: pulls yesterday's accepted submissions from
//! the enabled judges and folds them into the archive.

use std::path::PathBuf;
use std::sync::Arc;

use archiver::error::Result;
use archiver::models::Config;
use archiver::pipeline;
use archiver::services::NoSession;
use archiver::utils::log;
use clap::{Parser, Subcommand};

/// Daily online-judge submission archiver
#[derive(Parser, Debug)]
#[command(name = "archiver", version, about = "Daily online-judge submission archiver")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, render and archive yesterday's accepted submissions
    Run {
        /// Fetch and render only; skip publishing and the index merge
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);
    if cli.quiet {
        config.logging.level = "warn".to_string();
        config.logging.show_progress = false;
    }
    log::init(&config.logging.level);

    match cli.command {
        Command::Run { dry_run } => {
            config.validate()?;
            // Browser-automation sessions are provided by an external
            // integration; without one, source fetches degrade to
            // placeholders.
            let session = Arc::new(NoSession);
            pipeline::run_pipeline(&config, session, dry_run).await?;
        }
        Command::Validate => {
            archiver::config::load_validated(&cli.config)?;
            log::success(&format!("Configuration at {:?} is valid", cli.config));
        }
    }

    Ok(())
}
