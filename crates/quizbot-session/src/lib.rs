//! Session store with TTL expiry and capacity eviction.
//!
//! This crate owns the authoritative mapping from user to quiz [`Session`]:
//! - TTL expiry, checked lazily on every read and eagerly by [`SessionStore::sweep`]
//! - Capacity eviction of the oldest-inserted session when the store is full
//! - A [`Clock`] seam so expiry can be tested without sleeping
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use quizbot_session::{SessionState, SessionStore, StoreConfig};
//! use quizbot_types::{TicketId, UserId};
//!
//! let config = StoreConfig::default()
//!     .with_max_sessions(1000)
//!     .with_ttl(Duration::from_secs(30 * 60));
//!
//! let store = SessionStore::new(config).unwrap();
//! store.set(UserId(1), SessionState::new(TicketId(3)));
//! assert_eq!(store.get(UserId(1)).unwrap().current_question_index, 1);
//! ```

mod clock;
mod config;
mod error;
mod session;
mod store;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use session::{Session, SessionState, SessionUpdate};
pub use store::{SessionStore, StoreStats};
pub use ttl::TtlPolicy;
