//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [session]
//! ttl_minutes = 30
//! max_sessions = 10000
//! sweep_interval_secs = 300
//!
//! [cache]
//! max_entries = 256
//!
//! [images]
//! dir = "images"
//! max_bytes = 52428800
//!
//! [questions]
//! dir = "questions"
//! pass_threshold_percent = 90
//!
//! [logging]
//! dir = "logs"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use quizbot_types::config_defaults as defaults;
use quizbot_types::{ConfigProvider, HasCacheConfig, HasSessionConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged. Accessors fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizbotConfig {
    /// Session store configuration.
    pub session: Option<SessionConfig>,

    /// Lookup cache configuration.
    pub cache: Option<CacheConfig>,

    /// Image directory and cache budget.
    pub images: Option<ImagesConfig>,

    /// Question corpus configuration.
    pub questions: Option<QuestionsConfig>,

    /// Log output configuration.
    pub logging: Option<LoggingConfig>,
}

impl QuizbotConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: QuizbotConfig) {
        if other.session.is_some() {
            self.session = other.session;
        }

        if other.cache.is_some() {
            self.cache = other.cache;
        }

        if other.images.is_some() {
            self.images = other.images;
        }

        if other.questions.is_some() {
            self.questions = other.questions;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Effective session settings.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Effective lookup cache settings.
    pub fn cache(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }

    /// Effective image settings.
    pub fn images(&self) -> ImagesConfig {
        self.images.clone().unwrap_or_default()
    }

    /// Effective question corpus settings.
    pub fn questions(&self) -> QuestionsConfig {
        self.questions.clone().unwrap_or_default()
    }

    /// Effective logging settings.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Copy with every section filled in, defaults included.
    pub fn resolved(&self) -> QuizbotConfig {
        QuizbotConfig {
            session: Some(self.session()),
            cache: Some(self.cache()),
            images: Some(self.images()),
            questions: Some(self.questions()),
            logging: Some(self.logging()),
        }
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<()> {
        let session = self.session();
        if session.ttl_minutes == 0 {
            return Err(invalid("session.ttl_minutes", "must be greater than zero"));
        }
        if session.ttl_minutes.checked_mul(60).is_none() {
            return Err(invalid("session.ttl_minutes", "is too large"));
        }
        if session.max_sessions == 0 {
            return Err(invalid("session.max_sessions", "must be greater than zero"));
        }
        if session.sweep_interval_secs == 0 {
            return Err(invalid(
                "session.sweep_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.cache().max_entries == 0 {
            return Err(invalid("cache.max_entries", "must be greater than zero"));
        }
        if self.images().max_bytes == 0 {
            return Err(invalid("images.max_bytes", "must be greater than zero"));
        }
        if self.questions().pass_threshold_percent > 100 {
            return Err(invalid(
                "questions.pass_threshold_percent",
                "must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl ConfigProvider for QuizbotConfig {}

impl HasSessionConfig for QuizbotConfig {
    fn max_sessions(&self) -> usize {
        self.session().max_sessions
    }

    fn session_ttl(&self) -> Duration {
        self.session().session_ttl()
    }

    fn sweep_interval(&self) -> Duration {
        self.session().sweep_interval()
    }
}

impl HasCacheConfig for QuizbotConfig {
    fn max_entries(&self) -> usize {
        self.cache().max_entries
    }

    fn image_cache_bytes(&self) -> usize {
        self.images().max_bytes
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration.
///
/// ```toml
/// [session]
/// ttl_minutes = 30
/// max_sessions = 10000
/// sweep_interval_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle minutes before a session expires.
    pub ttl_minutes: u64,
    /// Maximum number of concurrent sessions.
    pub max_sessions: usize,
    /// Interval in seconds between sweeps of expired sessions.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: defaults::SESSION_TTL_MINUTES,
            max_sessions: defaults::MAX_SESSIONS,
            sweep_interval_secs: defaults::SWEEP_INTERVAL_SECS,
        }
    }
}

impl ConfigProvider for SessionConfig {}

impl HasSessionConfig for SessionConfig {
    fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }

    fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Count-bounded lookup cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum entries per lookup cache.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: defaults::CACHE_MAX_ENTRIES,
        }
    }
}

/// Image directory and byte-budgeted cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Root directory question image paths are relative to.
    pub dir: PathBuf,
    /// Total byte budget of the image cache.
    pub max_bytes: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("images"),
            max_bytes: defaults::IMAGE_CACHE_BYTES,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Questions Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Question corpus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestionsConfig {
    /// Directory holding `ticket_<n>.json` files.
    pub dir: PathBuf,
    /// Minimum score percentage for a passed ticket.
    pub pass_threshold_percent: u8,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("questions"),
            pass_threshold_percent: defaults::PASS_THRESHOLD_PERCENT,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Log output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Directory for daily-rotated JSON logs. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}
