//! TTL policy for session expiration.

use std::time::{Duration, Instant};

/// Decides whether an entry has outlived its idle time.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    ttl: Duration,
}

impl TtlPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// An entry is expired once strictly more than `ttl` has passed since its
    /// last activity.
    pub fn is_expired(&self, last_activity: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_activity) > self.ttl
    }
}
