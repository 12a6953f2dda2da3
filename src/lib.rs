#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Quick Reference
//!
//! | Type | Description | Best Use Case |
//! |------|-------------|---------------|
//! | [`IncrementalCache`] | Snapshot + CAS publish, lock-guarded overflow | Write-once memoization, many readers |
//! | [`I64Cache`] | `IncrementalCache<i64, V>` | Integer-keyed memo tables |
//! | [`StrCache`] | `IncrementalCache<String, V>` | String-keyed memo tables |
//! | [`path::PathCache`] | `StrCache` of parsed paths | Repeated path expression lookups |
//!
//! ## Performance Characteristics
//!
//! | Path | Get | Set | Locks |
//! |------|-----|-----|-------|
//! | Snapshot | O(1) | O(n) per attempt | none |
//! | Backup store | O(1) | O(1) | shared / exclusive `RwLock` |
//!
//! ## Code Examples
//!
//! ### Write once, read many
//!
//! ```rust
//! use rcu_cache::config::IncrementalCacheConfig;
//! use rcu_cache::StrCache;
//!
//! let cache: StrCache<usize> = StrCache::init(IncrementalCacheConfig::default(), None);
//!
//! assert!(!cache.set("len".to_string(), 3));
//! assert!(cache.set("len".to_string(), 4)); // already recorded, value kept
//! assert_eq!(cache.get("len"), Some(3));
//! assert_eq!(cache.get("other"), None);
//! ```
//!
//! ### Forcing the overflow path
//!
//! A budget of zero sends every write to the backup store. Reads still find
//! the value and move it into the snapshot.
//!
//! ```rust
//! use rcu_cache::config::IncrementalCacheConfig;
//! use rcu_cache::I64Cache;
//!
//! let config = IncrementalCacheConfig { max_cas_attempts: 0 };
//! let cache: I64Cache<&str> = I64Cache::init(config, None);
//!
//! cache.set(7, "seven");
//! assert_eq!(cache.backup_len(), 1);
//! assert_eq!(cache.get(&7), Some("seven"));
//! assert_eq!(cache.stats().backup_hits, 1);
//! ```
//!
//! ## Modules
//!
//! - [`incremental`]: The cache facade and its copy-update engine
//! - [`snapshot`]: Immutable snapshots and the atomically swappable slot
//! - [`path`]: Simple-path parsing and its memoizer
//! - [`config`]: Configuration structures
//! - [`metrics`]: Metrics collection for cache performance monitoring

/// Immutable snapshots and the slot that publishes them.
///
/// Readers load the current snapshot with a single atomic read; writers
/// replace it wholesale with a compare-and-swap.
pub mod snapshot;

/// Lock-guarded overflow store.
pub(crate) mod backup;

/// Cache configuration structures.
///
/// Provides configuration structures for the cache and the path memoizer.
pub mod config;

/// Cache metrics system.
///
/// Provides counters for every path a request can take and a common reporting
/// interface.
pub mod metrics;

/// Incremental read-copy-update cache.
///
/// Provides a concurrent cache for write-once key-value relations with
/// lock-free reads of published entries.
pub mod incremental;

/// Simple-path parsing and memoization.
pub mod path;

#[cfg(feature = "hashbrown")]
pub use hashbrown::{DefaultHashBuilder, HashMap};

#[cfg(not(feature = "hashbrown"))]
pub use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
pub use std::collections::HashMap;

// Re-export cache types
pub use incremental::{I64Cache, IncrementalCache, StrCache};
pub use snapshot::{Snapshot, SnapshotSlot};
