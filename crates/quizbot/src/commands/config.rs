//! Config command - configuration management.

use anyhow::Result;
use clap::{Args, Subcommand};
use quizbot_config::ConfigSearch;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Show which config files are loaded and where the user config lives
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    if ctx.sources.is_empty() {
        println!("# No config files loaded (using defaults)");
    } else {
        for source in &ctx.sources {
            println!("# Loaded from {}", source.display());
        }
    }
    println!();
    print!("{}", ctx.config.resolved().to_toml()?);
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    match ConfigSearch::from_env().user_file() {
        Some(path) => println!("User config: {}", path.display()),
        None => eprintln!("Could not determine config directory"),
    }

    if ctx.sources.is_empty() {
        println!("Loaded: (none)");
    } else {
        for source in &ctx.sources {
            println!("Loaded: {}", source.display());
        }
    }
    Ok(())
}
