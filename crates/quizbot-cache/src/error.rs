//! Error types for cache construction.

/// Errors raised when a cache is configured with impossible limits.
///
/// Cache operations themselves never fail: misses are `None` and rejected
/// insertions are `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// A count-bounded cache needs room for at least one entry.
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,

    /// A byte-budgeted cache needs a non-zero budget.
    #[error("cache byte budget must be greater than zero")]
    ZeroBudget,
}

/// Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;
