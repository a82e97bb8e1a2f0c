//! Shared types for the Quizbot system.

pub mod config;
pub mod error;
pub mod ids;
pub mod question;

pub use config::{ConfigProvider, HasCacheConfig, HasSessionConfig, defaults as config_defaults};
pub use error::{Error, Result};
pub use ids::{QuestionId, TicketId, UserId};
pub use question::{Question, Ticket};
