//! Configuration traits for decoupled config passing between crates.
//!
//! These traits allow the session store and the domain layer to depend on
//! configuration capabilities without knowing the full TOML structure.

use std::time::Duration;

/// Base trait for all configuration types.
pub trait ConfigProvider: Clone + Send + Sync + 'static {}

/// Session store configuration.
pub trait HasSessionConfig: ConfigProvider {
    /// Maximum number of concurrent sessions before capacity eviction.
    fn max_sessions(&self) -> usize;

    /// Idle time after which a session is treated as expired.
    fn session_ttl(&self) -> Duration;

    /// Interval between periodic sweeps of expired sessions.
    fn sweep_interval(&self) -> Duration {
        defaults::sweep_interval()
    }
}

/// Lookup and image cache configuration.
pub trait HasCacheConfig: ConfigProvider {
    /// Maximum number of entries for count-bounded lookup caches.
    fn max_entries(&self) -> usize;

    /// Total byte budget of the image cache.
    fn image_cache_bytes(&self) -> usize;
}

/// Default configuration values.
pub mod defaults {
    use std::time::Duration;

    pub const MAX_SESSIONS: usize = 10_000;
    pub const SESSION_TTL_MINUTES: u64 = 30;
    pub const SWEEP_INTERVAL_SECS: u64 = 300;
    pub const CACHE_MAX_ENTRIES: usize = 256;
    pub const IMAGE_CACHE_BYTES: usize = 50 * 1024 * 1024; // 50MB
    /// Minimum score for a passed ticket (percentage).
    pub const PASS_THRESHOLD_PERCENT: u8 = 90;

    pub fn session_ttl() -> Duration {
        Duration::from_secs(SESSION_TTL_MINUTES * 60)
    }

    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}
