//! Question image loading with a byte-budgeted cache.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;
use quizbot_cache::{ByteBudgetedCache, ByteCacheStats};
use tracing::{debug, trace};

use crate::error::{DomainError, Result};

/// Loads question images from disk, keeping recently used ones in memory.
///
/// Images too large for the cache are still served, just not retained.
pub struct ImageLoader {
    root: PathBuf,
    cache: Mutex<ByteBudgetedCache<String>>,
}

impl ImageLoader {
    /// Create a loader for images under `root` with a `max_bytes` cache budget.
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            cache: Mutex::new(ByteBudgetedCache::new(max_bytes)?),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load an image by its path relative to the image root.
    pub async fn load(&self, relative: &str) -> Result<Bytes> {
        let key = relative.to_string();
        let cached = self.cache.lock().get(&key);
        if let Some(data) = cached {
            trace!(path = relative, "Image cache hit");
            return Ok(data);
        }

        let path = self.resolve(relative)?;
        let data = tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| DomainError::ImageRead {
                path: path.clone(),
                source: e,
            })?;

        let admitted = self.cache.lock().set(key, data.clone());
        if !admitted {
            debug!(
                path = relative,
                size = data.len(),
                "Image too large to cache, serving uncached"
            );
        }

        Ok(data)
    }

    /// Whether an image is currently cached.
    pub fn is_cached(&self, relative: &str) -> bool {
        self.cache.lock().has(&relative.to_string())
    }

    /// Drop every cached image.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> ByteCacheStats {
        self.cache.lock().stats()
    }

    /// Join a relative path onto the root, refusing anything that could
    /// leave it.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        let is_plain = !relative.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_plain {
            return Err(DomainError::InvalidImagePath(relative.to_string()));
        }
        Ok(self.root.join(rel))
    }
}
