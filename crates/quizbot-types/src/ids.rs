//! Identifiers shared between the transport, the session store and the corpus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Opaque user identity supplied by the messaging transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a ticket (an ordered question set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u32);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TicketId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of a single question: its ticket plus its 1-based position.
///
/// The textual form is `"<ticket>:<number>"`, which is what travels in
/// transport callback payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId {
    pub ticket: TicketId,
    pub number: u32,
}

impl QuestionId {
    pub fn new(ticket: impl Into<TicketId>, number: u32) -> Self {
        Self {
            ticket: ticket.into(),
            number,
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ticket, self.number)
    }
}

impl FromStr for QuestionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidQuestionId(s.to_string());
        let (ticket, number) = s.trim().split_once(':').ok_or_else(invalid)?;
        let ticket: u32 = ticket.parse().map_err(|_| invalid())?;
        let number: u32 = number.parse().map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }
        Ok(Self::new(ticket, number))
    }
}
