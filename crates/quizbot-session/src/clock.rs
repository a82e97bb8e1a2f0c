//! Time source for session expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Time source used by the session store.
///
/// Production code uses [`SystemClock`]; tests use [`ManualClock`] to move
/// time forward without sleeping.
pub trait Clock: Send + Sync + 'static {
    /// Monotonic time, drives TTL expiry.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for reporting only.
    fn wall_time(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        (**self).wall_time()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    wall_start: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            wall_start: Utc::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        let offset = *self.offset.lock();
        self.wall_start + chrono::Duration::from_std(offset).unwrap_or(chrono::Duration::zero())
    }
}
