//! Error types for the shared Quizbot types.

use thiserror::Error;

/// Result type alias using the shared error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or validating corpus types.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid question id '{0}': expected '<ticket>:<number>'")]
    InvalidQuestionId(String),

    #[error("Invalid ticket {ticket}: {reason}")]
    InvalidTicket { ticket: u32, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
