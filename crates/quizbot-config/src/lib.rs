//! Configuration system for Quizbot.
//!
//! Provides TOML-based configuration with:
//! - Session store limits (`[session]`)
//! - Lookup and image cache budgets (`[cache]`, `[images]`)
//! - Question corpus location and pass threshold (`[questions]`)
//! - Optional JSON log directory (`[logging]`)
//! - Config file layering (user config dir + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigLayer, ConfigSearch, Layer, LayerStatus, LoadedConfig, load_config_file,
};
pub use error::{ConfigError, Result};
pub use types::*;
