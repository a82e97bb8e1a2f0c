//! Play command - console transport for the quiz.
//!
//! Reads one command per line from stdin and prints the reply to stdout. The
//! console plays the role a chat transport would: it remembers which question
//! it last showed and submits answers against that question id.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use quizbot_domain::{
    AnswerOutcome, DomainServices, QuestionId, QuestionView, QuizError, QuizSummary, TicketId,
    UserId, spawn_sweeper,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Context;

/// Arguments for the play command.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// User id the session is stored under
    #[arg(long, default_value_t = 1)]
    pub user: i64,

    /// Directory with ticket_<n>.json files (default: [questions].dir)
    #[arg(long, value_name = "DIR")]
    pub questions: Option<PathBuf>,

    /// Directory question images are resolved against (default: [images].dir)
    #[arg(long, value_name = "DIR")]
    pub images: Option<PathBuf>,
}

/// Run the play command.
pub async fn run(args: PlayArgs, ctx: &Context) -> Result<()> {
    let config = ctx.domain_config(args.questions, args.images);
    let services = DomainServices::open(&config).with_context(|| {
        format!(
            "Failed to open question corpus {}",
            config.questions_dir.display()
        )
    })?;

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        services.store().clone(),
        config.store.sweep_interval,
        cancel.clone(),
    );

    info!(user_id = args.user, "Console session started");
    println!("{}", HELP);

    let mut console = Console::new(services, UserId(args.user));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console.handle(&line).await {
            Some(reply) => {
                if !reply.is_empty() {
                    println!("{}", reply);
                }
            }
            None => break,
        }
    }

    cancel.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "Session sweeper task failed");
    }
    debug!("Console session ended");
    Ok(())
}

const HELP: &str = "Commands: tickets, start <n>, answer <k>, question, progress, reset, stats, help, quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Tickets,
    Start(TicketId),
    /// 1-based option number as typed.
    Answer(usize),
    Question,
    Progress,
    Reset,
    Stats,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match (head.to_lowercase().as_str(), arg) {
            ("tickets", None) => Self::Tickets,
            ("start", Some(n)) => Self::Start(TicketId(
                n.parse()
                    .map_err(|_| format!("Not a ticket number: {}", n))?,
            )),
            ("answer", Some(k)) => match k.parse::<usize>() {
                Ok(k) if k >= 1 => Self::Answer(k),
                _ => return Err(format!("Not an option number: {}", k)),
            },
            ("question", None) => Self::Question,
            ("progress", None) => Self::Progress,
            ("reset", None) => Self::Reset,
            ("stats", None) => Self::Stats,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("start" | "answer", None) => return Err(format!("Usage: {} <number>", head)),
            _ => return Err(format!("Unknown command: {}. {}", line.trim(), HELP)),
        };

        if words.next().is_some() {
            return Err(format!("Too many arguments. {}", HELP));
        }
        Ok(Some(command))
    }
}

/// Console transport state for one user.
struct Console {
    services: DomainServices,
    user: UserId,
    /// Question last shown, which `answer` refers to.
    shown: Option<QuestionId>,
}

impl Console {
    fn new(services: DomainServices, user: UserId) -> Self {
        Self {
            services,
            user,
            shown: None,
        }
    }

    /// Handle one input line. `None` means the user quit.
    async fn handle(&mut self, line: &str) -> Option<String> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Some(String::new()),
            Err(message) => return Some(message),
        };

        let quiz = self.services.quiz().clone();
        let reply = match command {
            Command::Quit => return None,
            Command::Help => HELP.to_string(),
            Command::Tickets => {
                let ids: Vec<String> = quiz.tickets().iter().map(|t| t.to_string()).collect();
                if ids.is_empty() {
                    "No tickets available".to_string()
                } else {
                    format!("Tickets: {}", ids.join(", "))
                }
            }
            Command::Start(ticket) => match quiz.select_ticket(self.user, ticket) {
                Ok(started) => {
                    let body = self.render_question(&started.first).await;
                    format!("Ticket {} started\n{}", started.ticket, body)
                }
                Err(e) => e.to_string(),
            },
            Command::Answer(k) => {
                let Some(question_id) = self.shown else {
                    return Some(QuizError::SessionExpired.to_string());
                };
                match quiz.submit_answer(self.user, question_id, k - 1) {
                    Ok(outcome) => self.render_outcome(outcome).await,
                    Err(e) => {
                        if e == QuizError::SessionExpired {
                            self.shown = None;
                        }
                        e.to_string()
                    }
                }
            }
            Command::Question => match quiz.current_question(self.user) {
                Ok(view) => self.render_question(&view).await,
                Err(e) => e.to_string(),
            },
            Command::Progress => match quiz.progress(self.user) {
                Ok(p) => format!(
                    "Ticket {}: question {}/{}, {} correct, {} incorrect",
                    p.ticket, p.current_index, p.total, p.correct, p.incorrect
                ),
                Err(e) => e.to_string(),
            },
            Command::Reset => {
                self.shown = None;
                if quiz.reset(self.user) {
                    "Session reset".to_string()
                } else {
                    "Nothing to reset".to_string()
                }
            }
            Command::Stats => self.render_stats(),
        };
        Some(reply)
    }

    async fn render_question(&mut self, view: &QuestionView) -> String {
        self.shown = Some(view.question.id);

        let mut out = format!(
            "Question {}/{}: {}",
            view.position, view.total, view.question.text
        );
        if let Some(image) = &view.question.image {
            match self.services.images().load(image).await {
                Ok(data) => {
                    let _ = write!(out, "\n[image {}: {} bytes]", image, data.len());
                }
                Err(e) => {
                    warn!(image = %image, error = %e, "Failed to load question image");
                    let _ = write!(out, "\n[image {} unavailable]", image);
                }
            }
        }
        for (i, option) in view.question.options.iter().enumerate() {
            let _ = write!(out, "\n  {}) {}", i + 1, option);
        }
        out
    }

    async fn render_outcome(&mut self, outcome: AnswerOutcome) -> String {
        let verdict = outcome.verdict();
        let mut out = if verdict.correct {
            "Correct!".to_string()
        } else {
            format!("Wrong. The answer was {}", verdict.correct_index + 1)
        };
        if let Some(explanation) = &verdict.explanation {
            let _ = write!(out, "\n{}", explanation);
        }

        match outcome {
            AnswerOutcome::Next { next, .. } => {
                let body = self.render_question(&next).await;
                let _ = write!(out, "\n{}", body);
            }
            AnswerOutcome::Completed { summary, .. } => {
                self.shown = None;
                let _ = write!(out, "\n{}", self.render_summary(&summary));
            }
        }
        out
    }

    fn render_summary(&self, summary: &QuizSummary) -> String {
        let verdict = if summary.passed(self.services.quiz().pass_threshold_percent()) {
            "PASSED"
        } else {
            "FAILED"
        };
        format!(
            "Ticket {} complete: {}/{} correct ({:.0}%) in {}s. {}",
            summary.ticket,
            summary.correct,
            summary.total,
            summary.score_percent(),
            summary.elapsed.as_secs(),
            verdict
        )
    }

    fn render_stats(&self) -> String {
        let sessions = self.services.store().stats();
        let images = self.services.images().stats();
        format!(
            "Sessions: {}/{} ({:.1}%), ttl {}s\nImages: {} cached, {}/{} bytes ({:.1}%)",
            sessions.active_count,
            sessions.capacity,
            sessions.utilization,
            sessions.ttl.as_secs(),
            images.item_count,
            images.current_size_bytes,
            images.max_size_bytes,
            images.utilization_percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizbot_domain::{ImageLoader, InMemoryQuestionBank, SessionStore, StoreConfig, Ticket};
    use std::sync::Arc;

    fn ticket(id: u32, questions: u32) -> Ticket {
        let body: Vec<String> = (1..=questions)
            .map(|n| {
                format!(r#"{{ "text": "Q{n}", "options": ["yes", "no"], "correct_index": 1 }}"#)
            })
            .collect();
        Ticket::from_json(&format!(
            r#"{{ "id": {id}, "questions": [{}] }}"#,
            body.join(",")
        ))
        .unwrap()
    }

    fn console() -> Console {
        let store = Arc::new(SessionStore::new(StoreConfig::new()).unwrap());
        let bank = Arc::new(InMemoryQuestionBank::new([ticket(1, 2), ticket(2, 1)]));
        let images = Arc::new(ImageLoader::new("images", 1024).unwrap());
        Console::new(DomainServices::new(store, bank, images, 90), UserId(7))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("tickets"), Ok(Some(Command::Tickets)));
        assert_eq!(Command::parse("  START 3 "), Ok(Some(Command::Start(TicketId(3)))));
        assert_eq!(Command::parse("answer 2"), Ok(Some(Command::Answer(2))));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse(""), Ok(None));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("answer 0").is_err());
        assert!(Command::parse("answer x").is_err());
        assert!(Command::parse("start").is_err());
        assert!(Command::parse("tickets 1").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_full_ticket() {
        let mut console = console();

        let reply = console.handle("start 1").await.unwrap();
        assert!(reply.contains("Question 1/2: Q1"));
        assert!(reply.contains("2) no"));

        let reply = console.handle("answer 2").await.unwrap();
        assert!(reply.starts_with("Correct!"));
        assert!(reply.contains("Question 2/2: Q2"));

        let reply = console.handle("answer 1").await.unwrap();
        assert!(reply.contains("Wrong. The answer was 2"));
        assert!(reply.contains("1/2 correct (50%)"));
        assert!(reply.contains("FAILED"));

        let reply = console.handle("answer 1").await.unwrap();
        assert_eq!(reply, QuizError::SessionExpired.to_string());
    }

    #[tokio::test]
    async fn test_unknown_ticket_and_quit() {
        let mut console = console();

        let reply = console.handle("start 9").await.unwrap();
        assert_eq!(reply, QuizError::TicketNotFound(TicketId(9)).to_string());
        assert_eq!(console.handle("tickets").await.unwrap(), "Tickets: 1, 2");
        assert!(console.handle("quit").await.is_none());
    }

    #[tokio::test]
    async fn test_progress_and_reset() {
        let mut console = console();
        console.handle("start 1").await.unwrap();
        console.handle("answer 1").await.unwrap();

        let reply = console.handle("progress").await.unwrap();
        assert_eq!(reply, "Ticket 1: question 2/2, 0 correct, 1 incorrect");

        assert_eq!(console.handle("reset").await.unwrap(), "Session reset");
        assert_eq!(console.handle("reset").await.unwrap(), "Nothing to reset");
        assert!(console.handle("stats").await.unwrap().starts_with("Sessions: 0/"));
    }
}
