//! Check command - validate a question corpus.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use quizbot_domain::{FileQuestionBank, QuestionBank};

use super::Context;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory with ticket_<n>.json files (default: [questions].dir)
    #[arg(long, value_name = "DIR")]
    pub questions: Option<PathBuf>,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let dir = args.questions.unwrap_or(ctx.config.questions().dir);
    let bank = FileQuestionBank::open(&dir, ctx.config.cache().max_entries)
        .with_context(|| format!("Failed to open question corpus {}", dir.display()))?;

    let mut loaded = 0usize;
    let mut questions = 0usize;
    let mut failed = 0usize;

    for id in bank.ticket_ids() {
        match bank.load_ticket(id) {
            Ok(ticket) => {
                loaded += 1;
                questions += ticket.len();
                if ctx.verbose {
                    println!("  ticket {}: {} questions", id, ticket.len());
                }
                if ticket.is_empty() {
                    println!("  ticket {}: no questions, cannot be started", id);
                }
            }
            Err(e) => {
                failed += 1;
                println!("  {}", e);
            }
        }
    }

    println!(
        "{} tickets, {} questions, {} malformed",
        loaded, questions, failed
    );

    if loaded == 0 {
        bail!("No tickets could be loaded from {}", dir.display());
    }
    Ok(())
}
