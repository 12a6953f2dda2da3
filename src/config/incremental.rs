//! Configuration for the incremental read-copy-update cache.
//!
//! # Choosing `max_cas_attempts`
//!
//! Every optimistic attempt copies the whole current snapshot, so one write
//! costs at most `max_cas_attempts × snapshot_len` entry copies before it falls
//! back to the lock-guarded backup store.
//!
//! - **Small, slowly growing key sets** (memoized parses, interned names): a
//!   large budget keeps nearly everything in the lock-free snapshot.
//! - **`0`**: every write goes straight to the backup store. Correct, but all
//!   reads of such keys take the shared lock. Useful for contention testing.
//!
//! # Examples
//!
//! ```
//! use rcu_cache::config::IncrementalCacheConfig;
//!
//! let config = IncrementalCacheConfig::default();
//! assert_eq!(config.max_cas_attempts, 1000);
//!
//! let degenerate = IncrementalCacheConfig { max_cas_attempts: 0 };
//! assert_eq!(degenerate.max_cas_attempts, 0);
//! ```

use core::fmt;

/// Attempt budget used by [`IncrementalCacheConfig::default`].
pub const DEFAULT_MAX_CAS_ATTEMPTS: usize = 1000;

/// Configuration for an [`IncrementalCache`](crate::IncrementalCache).
///
/// # Fields
///
/// - `max_cas_attempts`: Number of copy-update / compare-and-swap attempts a
///   writer makes before it stores the entry in the backup store instead.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IncrementalCacheConfig {
    /// Optimistic publish attempts per write before falling back to the backup store.
    pub max_cas_attempts: usize,
}

impl Default for IncrementalCacheConfig {
    fn default() -> Self {
        Self {
            max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS,
        }
    }
}

impl fmt::Debug for IncrementalCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalCacheConfig")
            .field("max_cas_attempts", &self.max_cas_attempts)
            .finish()
    }
}
