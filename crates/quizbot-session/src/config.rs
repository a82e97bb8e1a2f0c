//! Configuration for the session store.

use std::time::Duration;

use quizbot_types::HasSessionConfig;
use quizbot_types::config_defaults as defaults;

use crate::error::{Error, Result};

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of sessions before the oldest-inserted one is evicted.
    pub max_sessions: usize,

    /// Idle time after which a session is treated as absent.
    pub ttl: Duration,

    /// Interval for the periodic sweep of expired sessions.
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: defaults::MAX_SESSIONS,
            ttl: defaults::session_ttl(),
            sweep_interval: defaults::sweep_interval(),
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any session config capability.
    pub fn from_provider(provider: &impl HasSessionConfig) -> Self {
        Self {
            max_sessions: provider.max_sessions(),
            ttl: provider.session_ttl(),
            sweep_interval: provider.sweep_interval(),
        }
    }

    /// Set the maximum number of concurrent sessions.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the session TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 {
            return Err(Error::InvalidConfig(
                "max_sessions must be greater than zero".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(Error::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
