//! Error types for session store construction.

/// Error type for the session store.
///
/// Lookups never fail: a missing or expired session is `None`. Only an
/// impossible configuration is reported as an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store configuration cannot be honored.
    #[error("Invalid session store config: {0}")]
    InvalidConfig(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
