//! CLI command handlers.

pub mod check;
pub mod config;
pub mod play;

use std::path::PathBuf;

use quizbot_config::QuizbotConfig;
use quizbot_domain::DomainConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective merged configuration.
    pub config: QuizbotConfig,
    /// Config files that contributed to `config`, lowest precedence first.
    pub sources: Vec<PathBuf>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Domain settings from config, with optional directory overrides.
    pub fn domain_config(
        &self,
        questions_dir: Option<PathBuf>,
        images_dir: Option<PathBuf>,
    ) -> DomainConfig {
        let questions = self.config.questions();
        DomainConfig {
            questions_dir: questions_dir.unwrap_or(questions.dir),
            images_dir: images_dir.unwrap_or(self.config.images().dir),
            pass_threshold_percent: questions.pass_threshold_percent,
            ..DomainConfig::from_provider(&self.config)
        }
    }
}
