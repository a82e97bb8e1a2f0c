//! Per-user quiz progress.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use quizbot_types::{TicketId, UserId};

/// One user's progress through a single ticket attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,

    /// Ticket being attempted.
    pub current_ticket: TicketId,

    /// 1-based position of the next question to answer.
    pub current_question_index: u32,

    pub correct_count: u32,
    pub incorrect_count: u32,

    /// When the attempt started (monotonic, for elapsed time).
    pub started_at: Instant,

    /// When the attempt started (wall clock, for display).
    pub created_at: DateTime<Utc>,

    /// Refreshed on every read and write; drives TTL expiry.
    pub last_activity_at: Instant,
}

impl Session {
    pub(crate) fn new(
        user_id: UserId,
        state: SessionState,
        now: Instant,
        wall: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            current_ticket: state.current_ticket,
            current_question_index: state.current_question_index,
            correct_count: state.correct_count,
            incorrect_count: state.incorrect_count,
            started_at: now,
            created_at: wall,
            last_activity_at: now,
        }
    }

    /// Number of questions scored so far.
    pub fn answered(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }

    /// Time since the attempt started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub(crate) fn apply(&mut self, update: SessionUpdate) {
        if let Some(ticket) = update.current_ticket {
            self.current_ticket = ticket;
        }
        if let Some(index) = update.current_question_index {
            self.current_question_index = index;
        }
        if let Some(correct) = update.correct_count {
            self.correct_count = correct;
        }
        if let Some(incorrect) = update.incorrect_count {
            self.incorrect_count = incorrect;
        }
    }
}

/// Initial fields of a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub current_ticket: TicketId,
    pub current_question_index: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

impl SessionState {
    /// Start of a ticket: first question, nothing scored.
    pub fn new(ticket: TicketId) -> Self {
        Self {
            current_ticket: ticket,
            current_question_index: 1,
            correct_count: 0,
            incorrect_count: 0,
        }
    }
}

/// Partial set of fields merged into a live session by
/// [`SessionStore::update`](crate::SessionStore::update).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub current_ticket: Option<TicketId>,
    pub current_question_index: Option<u32>,
    pub correct_count: Option<u32>,
    pub incorrect_count: Option<u32>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question_index(mut self, index: u32) -> Self {
        self.current_question_index = Some(index);
        self
    }

    pub fn correct_count(mut self, count: u32) -> Self {
        self.correct_count = Some(count);
        self
    }

    pub fn incorrect_count(mut self, count: u32) -> Self {
        self.incorrect_count = Some(count);
        self
    }
}
