//! Quizbot - ticket-based quiz with session expiry and bounded caches
//!
//! Main entry point for the Quizbot CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use quizbot_config::{ConfigSearch, QuizbotConfig};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use commands::{check, config, play};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Quizbot - ticket-based quiz with session expiry and bounded caches
#[derive(Parser)]
#[command(name = "quizbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load exactly this config file instead of discovering layers
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Take quiz tickets in the console
    Play(play::PlayArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Validate a question corpus
    Check(check::CheckArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources, warnings) = match &cli.config {
        Some(path) => {
            let config = quizbot_config::load_config_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (config, vec![path.clone()], Vec::new())
        }
        None => {
            let loaded = ConfigSearch::from_env().load();
            let sources = loaded
                .loaded_from()
                .into_iter()
                .map(PathBuf::from)
                .collect();
            let warnings = loaded.warnings();
            (loaded.config, sources, warnings)
        }
    };
    config.validate().context("Invalid configuration")?;

    let _guard = init_tracing(cli.verbose, &config);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let ctx = commands::Context {
        config,
        sources,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Play(args) => play::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Check(args) => check::run(args, &ctx).await,
    }
}

/// Console (human-readable, stderr) plus, when `[logging].dir` is set, a
/// daily-rotated JSON file. The returned guard flushes the file on drop.
fn init_tracing(verbose: bool, config: &QuizbotConfig) -> Option<WorkerGuard> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default_filter = if verbose {
        "quizbot=debug,quizbot_domain=debug,quizbot_session=debug,quizbot_cache=debug,quizbot_config=debug,info"
    } else {
        "quizbot=info,quizbot_domain=info,quizbot_session=info,warn"
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match config.logging().dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "quizbot.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(
                    "quizbot=trace,quizbot_domain=trace,quizbot_session=trace,quizbot_cache=trace,quizbot_config=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    guard
}
