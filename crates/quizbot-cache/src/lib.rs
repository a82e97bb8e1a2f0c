//! In-memory caches with bounded footprint.
//!
//! - [`BoundedCache`]: count-bounded LRU for lookup memoization
//! - [`ByteBudgetedCache`]: byte-bounded LRU for raw buffers such as images
//!
//! Both are plain data structures: every operation takes `&mut self` and
//! runs to completion. Share them behind a lock.
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use quizbot_cache::{BoundedCache, ByteBudgetedCache};
//!
//! let mut lookups = BoundedCache::new(2).unwrap();
//! lookups.set("a", 1);
//! lookups.set("b", 2);
//! lookups.get(&"a");
//! lookups.set("c", 3); // evicts "b"
//! assert!(!lookups.has(&"b"));
//!
//! let mut images = ByteBudgetedCache::new(100).unwrap();
//! // Larger than half the budget: never admitted
//! assert!(!images.set("a.jpg".to_string(), Bytes::from(vec![0u8; 60])));
//! assert!(images.set("b.jpg".to_string(), Bytes::from(vec![0u8; 40])));
//! ```

mod bounded;
mod byte_budget;
mod error;

pub use bounded::{BoundedCache, BoundedCacheStats};
pub use byte_budget::{ByteBudgetedCache, ByteCacheStats};
pub use error::{CacheError, Result};
