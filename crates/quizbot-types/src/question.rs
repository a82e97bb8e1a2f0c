//! Question corpus types.
//!
//! A [`Ticket`] is an ordered, fixed-length sequence of [`Question`]s.
//! Tickets are stored on disk as JSON:
//!
//! ```json
//! {
//!   "id": 1,
//!   "questions": [
//!     { "text": "...", "options": ["a", "b", "c"], "correct_index": 1,
//!       "image": "1/1.jpg", "explanation": "..." }
//!   ]
//! }
//! ```
//!
//! Question ids are derived from the ticket id and the position in the list,
//! so they are not stored in the file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{QuestionId, TicketId};

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_index: usize,
    /// Image path relative to the image root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether `choice` (zero-based) is the correct option.
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }
}

/// An ordered question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub questions: Vec<Question>,
}

/// On-disk shape of a question; the id is implied by position.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    text: String,
    options: Vec<String>,
    correct_index: usize,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTicket {
    id: u32,
    questions: Vec<RawQuestion>,
}

impl Ticket {
    /// Parse and validate a ticket from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTicket = serde_json::from_str(json)?;
        let id = TicketId(raw.id);

        let mut questions = Vec::with_capacity(raw.questions.len());
        for (pos, q) in raw.questions.into_iter().enumerate() {
            let number = pos as u32 + 1;
            if q.options.is_empty() {
                return Err(Error::InvalidTicket {
                    ticket: raw.id,
                    reason: format!("question {number} has no options"),
                });
            }
            if q.correct_index >= q.options.len() {
                return Err(Error::InvalidTicket {
                    ticket: raw.id,
                    reason: format!(
                        "question {number} has correct_index {} but only {} options",
                        q.correct_index,
                        q.options.len()
                    ),
                });
            }
            questions.push(Question {
                id: QuestionId::new(id, number),
                text: q.text,
                options: q.options,
                correct_index: q.correct_index,
                image: q.image,
                explanation: q.explanation,
            });
        }

        Ok(Self { id, questions })
    }

    /// Number of questions in the ticket.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Get a question by its 1-based position.
    pub fn question(&self, number: u32) -> Option<&Question> {
        let idx = (number as usize).checked_sub(1)?;
        self.questions.get(idx)
    }
}
