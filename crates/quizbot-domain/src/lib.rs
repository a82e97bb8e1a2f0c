//! Domain facade for Quizbot.
//!
//! This crate ties the session store, the question corpus and the image
//! cache together behind the operations a chat transport needs:
//!
//! - **Quiz flow**: ticket selection, answer scoring, progress and reset
//! - **Question corpus**: in-memory or file-backed, with a bounded ticket cache
//! - **Images**: loaded from disk behind a byte-budgeted cache
//! - **Sweeping**: periodic removal of expired sessions
//!
//! # Example
//!
//! ```ignore
//! use quizbot_domain::{DomainConfig, DomainServices};
//!
//! let services = DomainServices::open(&DomainConfig::default())?;
//! let started = services.quiz().select_ticket(user, TicketId(1))?;
//! let outcome = services.quiz().submit_answer(user, started.first.question.id, 0)?;
//! ```

mod error;
pub mod questions;
pub mod services;
mod sweeper;

pub use error::{DomainError, QuizError, Result};
pub use questions::{FileQuestionBank, InMemoryQuestionBank, QuestionBank};
pub use services::images::ImageLoader;
pub use services::quiz::{
    AnswerOutcome, AnswerVerdict, Progress, QuestionView, QuizService, QuizSummary, TicketStarted,
};
pub use services::{DomainConfig, DomainServices};
pub use sweeper::spawn_sweeper;

// Re-export key types from infrastructure crates for convenience
pub use quizbot_session::{SessionStore, StoreConfig, StoreStats};
pub use quizbot_types::{Question, QuestionId, Ticket, TicketId, UserId};
