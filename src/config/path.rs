//! Configuration for the path memoizer.
//!
//! The memoizer is switched on or off per instance rather than through
//! process-wide state, so two callers can run with different settings.
//!
//! # Examples
//!
//! ```
//! use rcu_cache::config::{IncrementalCacheConfig, PathCacheConfig};
//! use rcu_cache::path::PathCache;
//!
//! let config = PathCacheConfig {
//!     enabled: true,
//!     cache: IncrementalCacheConfig { max_cas_attempts: 100 },
//! };
//! let paths = PathCache::new(config);
//! assert!(paths.is_enabled());
//! ```

use super::IncrementalCacheConfig;
use core::fmt;

/// Configuration for a [`PathCache`](crate::path::PathCache).
///
/// # Fields
///
/// - `enabled`: When `false`, lookups return nothing and the cache is never touched.
/// - `cache`: Configuration of the underlying incremental cache.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PathCacheConfig {
    /// Whether simple-path memoization is active.
    pub enabled: bool,
    /// Configuration for the backing incremental cache.
    pub cache: IncrementalCacheConfig,
}

impl Default for PathCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache: IncrementalCacheConfig::default(),
        }
    }
}

impl fmt::Debug for PathCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCacheConfig")
            .field("enabled", &self.enabled)
            .field("max_cas_attempts", &self.cache.max_cas_attempts)
            .finish()
    }
}
