//! Ticket selection and answer scoring.
//!
//! A user is in one of three states:
//!
//! - no session
//! - in progress on question `i` of `N`
//! - completed, which is never stored: answering question `N` deletes the
//!   session and returns the summary in the same step
//!
//! Every transition is a synchronous call that returns an explicit result, so
//! the transport only renders what it gets back.

use std::sync::Arc;
use std::time::Duration;

use quizbot_session::{Session, SessionState, SessionStore};
use quizbot_types::{Question, QuestionId, Ticket, TicketId, UserId};
use tracing::{debug, info};

use crate::error::QuizError;
use crate::questions::QuestionBank;

/// A question together with its position in the ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub question: Question,
    /// 1-based position.
    pub position: u32,
    pub total: u32,
}

/// Result of choosing a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketStarted {
    pub ticket: TicketId,
    pub first: QuestionView,
}

/// Whether a submitted answer was right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub correct: bool,
    /// Zero-based index the user chose.
    pub chosen: usize,
    /// Zero-based index of the right option.
    pub correct_index: usize,
    pub explanation: Option<String>,
}

/// Counters of a session in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub ticket: TicketId,
    /// 1-based position of the next question.
    pub current_index: u32,
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl Progress {
    fn of(session: &Session, total: u32) -> Self {
        Self {
            ticket: session.current_ticket,
            current_index: session.current_question_index,
            total,
            correct: session.correct_count,
            incorrect: session.incorrect_count,
        }
    }

    pub fn answered(&self) -> u32 {
        self.correct + self.incorrect
    }
}

/// Final counters of a completed ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub ticket: TicketId,
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub elapsed: Duration,
}

impl QuizSummary {
    /// Share of correct answers, 0-100.
    pub fn score_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total) * 100.0
    }

    /// Whether the score reaches `threshold_percent`.
    pub fn passed(&self, threshold_percent: u8) -> bool {
        self.score_percent() >= f64::from(threshold_percent)
    }
}

/// What happened after an answer was scored.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// More questions remain.
    Next {
        verdict: AnswerVerdict,
        next: QuestionView,
        progress: Progress,
    },
    /// That was the last question; the session is gone.
    Completed {
        verdict: AnswerVerdict,
        summary: QuizSummary,
    },
}

impl AnswerOutcome {
    pub fn verdict(&self) -> &AnswerVerdict {
        match self {
            Self::Next { verdict, .. } | Self::Completed { verdict, .. } => verdict,
        }
    }
}

/// Quiz state machine over a session store and a question bank.
#[derive(Clone)]
pub struct QuizService {
    store: Arc<SessionStore>,
    bank: Arc<dyn QuestionBank>,
    pass_threshold_percent: u8,
}

impl QuizService {
    pub fn new(
        store: Arc<SessionStore>,
        bank: Arc<dyn QuestionBank>,
        pass_threshold_percent: u8,
    ) -> Self {
        Self {
            store,
            bank,
            pass_threshold_percent,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Minimum score, in percent, that counts as a pass.
    pub fn pass_threshold_percent(&self) -> u8 {
        self.pass_threshold_percent
    }

    /// Ticket menu.
    pub fn tickets(&self) -> Vec<TicketId> {
        self.bank.ticket_ids()
    }

    /// Start (or restart) a ticket. Any previous session is discarded.
    pub fn select_ticket(
        &self,
        user: UserId,
        ticket_id: TicketId,
    ) -> Result<TicketStarted, QuizError> {
        let ticket = self
            .bank
            .ticket(ticket_id)
            .filter(|t| !t.is_empty())
            .ok_or(QuizError::TicketNotFound(ticket_id))?;

        self.store.set(user, SessionState::new(ticket_id));
        debug!(user_id = %user, ticket = %ticket_id, questions = ticket.len(), "Ticket started");

        let first = view(&ticket, 1).ok_or(QuizError::TicketNotFound(ticket_id))?;
        Ok(TicketStarted {
            ticket: ticket_id,
            first,
        })
    }

    /// Score an answer and advance the session.
    ///
    /// `choice` is the zero-based option index. Only the question the session
    /// is currently on can be answered; anything else is
    /// [`QuizError::StaleQuestion`]. On any error nothing changes.
    pub fn submit_answer(
        &self,
        user: UserId,
        question_id: QuestionId,
        choice: usize,
    ) -> Result<AnswerOutcome, QuizError> {
        let session = self.store.peek(user).ok_or(QuizError::SessionExpired)?;
        let question = self
            .bank
            .question(&question_id)
            .ok_or(QuizError::QuestionNotFound(question_id))?;
        if !is_current(&session, question_id) {
            debug!(user_id = %user, question = %question_id, "Stale answer rejected");
            return Err(QuizError::StaleQuestion(question_id));
        }
        let ticket = self
            .bank
            .ticket(session.current_ticket)
            .ok_or(QuizError::TicketNotFound(session.current_ticket))?;
        let total = ticket.len() as u32;
        let correct = question.is_correct(choice);

        let advanced = self
            .store
            .with_mut(user, |s| {
                // Restarted or answered since the peek above
                if !is_current(s, question_id) {
                    return Err(QuizError::StaleQuestion(question_id));
                }
                if correct {
                    s.correct_count += 1;
                } else {
                    s.incorrect_count += 1;
                }
                s.current_question_index += 1;
                Ok(s.clone())
            })
            .ok_or(QuizError::SessionExpired)??;

        let verdict = AnswerVerdict {
            correct,
            chosen: choice,
            correct_index: question.correct_index,
            explanation: question.explanation.clone(),
        };

        if advanced.current_question_index > total {
            self.store.delete(user);
            let summary = QuizSummary {
                ticket: ticket.id,
                correct: advanced.correct_count,
                incorrect: advanced.incorrect_count,
                total,
                elapsed: advanced.elapsed(self.store.now()),
            };
            info!(
                user_id = %user,
                ticket = %ticket.id,
                correct = summary.correct,
                incorrect = summary.incorrect,
                "Ticket completed"
            );
            return Ok(AnswerOutcome::Completed { verdict, summary });
        }

        let next = view(&ticket, advanced.current_question_index)
            .ok_or(QuizError::SessionExpired)?;
        Ok(AnswerOutcome::Next {
            verdict,
            next,
            progress: Progress::of(&advanced, total),
        })
    }

    /// The question the user is currently on.
    pub fn current_question(&self, user: UserId) -> Result<QuestionView, QuizError> {
        let session = self.store.get(user).ok_or(QuizError::SessionExpired)?;
        let ticket = self
            .bank
            .ticket(session.current_ticket)
            .ok_or(QuizError::TicketNotFound(session.current_ticket))?;
        view(&ticket, session.current_question_index).ok_or(QuizError::SessionExpired)
    }

    /// Counters of the user's session.
    pub fn progress(&self, user: UserId) -> Result<Progress, QuizError> {
        let session = self.store.get(user).ok_or(QuizError::SessionExpired)?;
        let total = self
            .bank
            .ticket(session.current_ticket)
            .map(|t| t.len() as u32)
            .ok_or(QuizError::TicketNotFound(session.current_ticket))?;
        Ok(Progress::of(&session, total))
    }

    /// Abandon the current attempt. Returns whether there was one.
    pub fn reset(&self, user: UserId) -> bool {
        let removed = self.store.delete(user);
        if removed {
            debug!(user_id = %user, "Session reset by user");
        }
        removed
    }
}

fn is_current(session: &Session, id: QuestionId) -> bool {
    session.current_ticket == id.ticket && session.current_question_index == id.number
}

fn view(ticket: &Ticket, position: u32) -> Option<QuestionView> {
    Some(QuestionView {
        question: ticket.question(position)?.clone(),
        position,
        total: ticket.len() as u32,
    })
}
