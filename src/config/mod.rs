//! Cache Configuration Module
//!
//! Configuration structures for the incremental cache and the path memoizer.
//!
//! # Design Philosophy
//!
//! Configuration structs have all public fields for simple instantiation:
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Type safety**: All parameters must be provided at construction
//! - **Defaults**: `Default` mirrors the settings used for path memoization
//!
//! | Config | Used by | Description |
//! |--------|---------|-------------|
//! | `IncrementalCacheConfig` | [`IncrementalCache`](crate::IncrementalCache) | Optimistic attempt budget |
//! | `PathCacheConfig` | [`PathCache`](crate::path::PathCache) | Enable flag plus cache config |
//!
//! # Examples
//!
//! ```
//! use rcu_cache::config::IncrementalCacheConfig;
//! use rcu_cache::IncrementalCache;
//!
//! let config = IncrementalCacheConfig {
//!     max_cas_attempts: 64,
//! };
//! let cache: IncrementalCache<String, i32> = IncrementalCache::init(config, None);
//! assert!(!cache.set("a".to_string(), 1));
//! ```

pub mod incremental;
pub mod path;

pub use incremental::{IncrementalCacheConfig, DEFAULT_MAX_CAS_ATTEMPTS};
pub use path::PathCacheConfig;
