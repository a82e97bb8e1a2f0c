//! Domain error types.

use std::path::PathBuf;

use quizbot_types::{QuestionId, TicketId};
use thiserror::Error;

/// Infrastructure errors raised while wiring up or serving the domain.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Question corpus could not be read.
    #[error("Corpus error in {path}: {message}")]
    Corpus { path: PathBuf, message: String },

    /// Image path escapes the image root or is otherwise unusable.
    #[error("Invalid image path: {0}")]
    InvalidImagePath(String),

    /// Image file could not be read.
    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cache construction failed.
    #[error("Cache error: {0}")]
    Cache(#[from] quizbot_cache::CacheError),

    /// Session store construction failed.
    #[error("Session store error: {0}")]
    Session(#[from] quizbot_session::Error),
}

/// Outcomes of a user action that did not lead to a transition.
///
/// These are expected conditions, not faults: the transport turns each one
/// into a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// No live session: never started, expired, evicted or already finished.
    #[error("No active session, please choose a ticket again")]
    SessionExpired,

    /// The ticket does not exist or has no questions.
    #[error("Ticket {0} not found, please choose another")]
    TicketNotFound(TicketId),

    /// The answered question is not in the corpus.
    #[error("Question {0} not found")]
    QuestionNotFound(QuestionId),

    /// The answered question is not the one the session is on, e.g. a
    /// replayed button or one from another ticket.
    #[error("Question {0} is not the current question")]
    StaleQuestion(QuestionId),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
