//! Domain services.
//!
//! This module contains the services a transport drives: the quiz state
//! machine and the image loader.

pub mod images;
pub mod quiz;

use std::path::PathBuf;
use std::sync::Arc;

use quizbot_session::{SessionStore, StoreConfig};
use quizbot_types::{HasCacheConfig, HasSessionConfig, config_defaults};
use tracing::info;

use crate::error::Result;
use crate::questions::{FileQuestionBank, QuestionBank};

/// Configuration for domain services.
#[derive(Debug, Clone)]
pub struct DomainConfig {
    /// Session store limits.
    pub store: StoreConfig,
    /// Directory holding `ticket_<n>.json` files.
    pub questions_dir: PathBuf,
    /// Parsed tickets kept in memory.
    pub max_cached_tickets: usize,
    /// Directory question images are resolved against.
    pub images_dir: PathBuf,
    /// Byte budget of the image cache.
    pub image_cache_bytes: usize,
    /// Minimum score, in percent, that counts as a pass.
    pub pass_threshold_percent: u8,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            questions_dir: PathBuf::from("questions"),
            max_cached_tickets: config_defaults::CACHE_MAX_ENTRIES,
            images_dir: PathBuf::from("images"),
            image_cache_bytes: config_defaults::IMAGE_CACHE_BYTES,
            pass_threshold_percent: config_defaults::PASS_THRESHOLD_PERCENT,
        }
    }
}

impl DomainConfig {
    /// Store limits and cache sizes from a config provider. Directories and
    /// the pass threshold keep their defaults.
    pub fn from_provider(provider: &(impl HasSessionConfig + HasCacheConfig)) -> Self {
        Self {
            store: StoreConfig::from_provider(provider),
            max_cached_tickets: provider.max_entries(),
            image_cache_bytes: provider.image_cache_bytes(),
            ..Self::default()
        }
    }
}

/// Domain services facade.
///
/// The entry point for transports. Cloning is cheap; every clone shares the
/// same session store, corpus and image cache.
#[derive(Clone)]
pub struct DomainServices {
    quiz: quiz::QuizService,
    images: Arc<images::ImageLoader>,
}

impl DomainServices {
    /// Assemble services from already-built components.
    pub fn new(
        store: Arc<SessionStore>,
        bank: Arc<dyn QuestionBank>,
        images: Arc<images::ImageLoader>,
        pass_threshold_percent: u8,
    ) -> Self {
        Self {
            quiz: quiz::QuizService::new(store, bank, pass_threshold_percent),
            images,
        }
    }

    /// Build the store, the file-backed corpus and the image loader.
    pub fn open(config: &DomainConfig) -> Result<Self> {
        info!(
            questions = %config.questions_dir.display(),
            images = %config.images_dir.display(),
            max_sessions = config.store.max_sessions,
            ttl_secs = config.store.ttl.as_secs(),
            "Initializing domain services"
        );

        let store = Arc::new(SessionStore::new(config.store.clone())?);
        let bank = Arc::new(FileQuestionBank::open(
            &config.questions_dir,
            config.max_cached_tickets,
        )?);
        let images = Arc::new(images::ImageLoader::new(
            &config.images_dir,
            config.image_cache_bytes,
        )?);

        Ok(Self::new(store, bank, images, config.pass_threshold_percent))
    }

    /// Get the quiz service.
    pub fn quiz(&self) -> &quiz::QuizService {
        &self.quiz
    }

    /// Get the image loader.
    pub fn images(&self) -> &Arc<images::ImageLoader> {
        &self.images
    }

    /// Get the session store.
    pub fn store(&self) -> &Arc<SessionStore> {
        self.quiz.store()
    }
}
