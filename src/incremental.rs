//! Incremental Read-Copy-Update Cache
//!
//! A concurrent cache for **fixed** key-value relations: once a key has a value,
//! that value never changes. Reads of published entries are a single atomic
//! load; writes copy the current snapshot, add one pair and publish the copy
//! with a compare-and-swap. A writer that keeps losing the race falls back to a
//! lock-guarded backup store after `max_cas_attempts` tries.
//!
//! # How It Works
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                          IncrementalCache                              │
//! │                                                                        │
//! │  get ──▶ SnapshotSlot::load ──hit──▶ value                             │
//! │              │ miss                                                    │
//! │              ▼                                                         │
//! │         BackupStore (RwLock, shared) ──hit──▶ value + promote ──┐      │
//! │              │ miss                                             │      │
//! │              ▼                                                  │      │
//! │            None                                                 │      │
//! │                                                                 ▼      │
//! │  set ──▶ copy snapshot + pair ──CAS──▶ published (≤ max_cas_attempts)  │
//! │              │ budget exhausted                                        │
//! │              ▼                                                         │
//! │         BackupStore (RwLock, exclusive) ──▶ insert if absent           │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Keeping both stores consistent
//!
//! The snapshot and the backup store are separate structures, so a value
//! written to one must never be contradicted by the other. Until the first
//! overflow write the backup store is empty and publishers never touch a lock.
//! The first overflow writer raises the store's `active` flag and republishes
//! the current snapshot under a new pointer, which makes every in-flight
//! optimistic publish fail its compare-and-swap. From then on publishers of a
//! key the snapshot lacks hold the shared lock across their backup check and
//! compare-and-swap, and overflow writers check the snapshot while holding the
//! exclusive lock. A `set` for a key already in the snapshot never locks.
//!
//! # Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `get` (snapshot hit) | one atomic load + hash lookup, no lock |
//! | `get` (backup hit) | shared lock + promotion attempt |
//! | `set` (optimistic) | O(snapshot len) per attempt |
//! | `set` (overflow) | one exclusive lock, O(1) amortized |
//!
//! Suitable for small-to-moderate, slowly growing key sets such as memoized
//! parses. Every publish copies the full snapshot.
//!
//! # Example
//!
//! ```rust
//! use rcu_cache::config::IncrementalCacheConfig;
//! use rcu_cache::IncrementalCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache: Arc<IncrementalCache<i64, String>> =
//!     Arc::new(IncrementalCache::init(IncrementalCacheConfig::default(), None));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for key in 0..16 {
//!                 cache.set(key, format!("writer-{}", t));
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert_eq!(cache.dump().len(), 16);
//! ```

use crate::backup::{insert_if_absent, BackupStore};
use crate::config::IncrementalCacheConfig;
use crate::metrics::{CacheMetrics, IncrementalCacheMetrics, IncrementalCacheStats};
use crate::snapshot::{Snapshot, SnapshotSlot};
use crate::{DefaultHashBuilder, HashMap};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Incremental cache keyed by `i64`.
pub type I64Cache<V> = IncrementalCache<i64, V>;

/// Incremental cache keyed by owned strings; look up with `&str`.
pub type StrCache<V> = IncrementalCache<String, V>;

/// Result of the optimistic copy-update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publish {
    Published,
    Existed,
    Exhausted,
}

/// Who is asking for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Write,
    /// Copying a backup entry into the snapshot; the key is known to be in the backup.
    Promotion,
}

/// A concurrent cache for write-once key-value relations.
///
/// Readers hit an immutable snapshot without locking. Writers publish a new
/// snapshot optimistically and overflow into a lock-guarded backup store when
/// they run out of attempts.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone`.
/// - `V`: Value type. Must implement `Clone`; share large values through `Arc`.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Fixed relation
///
/// [`set`](Self::set) never replaces a value. The first write for a key wins;
/// later writes for it report `true` and leave the stored value untouched.
/// Absence is reported as `None`, so every value, including "empty" ones, can
/// be cached and told apart from a miss.
///
/// # Example
///
/// ```rust
/// use rcu_cache::config::IncrementalCacheConfig;
/// use rcu_cache::IncrementalCache;
///
/// let cache: IncrementalCache<String, i32> =
///     IncrementalCache::init(IncrementalCacheConfig::default(), None);
///
/// assert!(!cache.set("a".to_string(), 1));
/// assert!(cache.set("a".to_string(), 2));
/// assert_eq!(cache.get("a"), Some(1));
/// assert_eq!(cache.get("b"), None);
/// ```
pub struct IncrementalCache<K, V, S = DefaultHashBuilder> {
    slot: SnapshotSlot<K, V, S>,
    backup: BackupStore<K, V, S>,
    max_cas_attempts: usize,
    metrics: IncrementalCacheMetrics,
}

impl<K, V> IncrementalCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a cache from a configuration and an optional pre-populated mapping.
    ///
    /// The initial mapping becomes the first snapshot. The backup store starts empty.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration specifying the optimistic attempt budget
    /// * `initial` - Entries to seed the snapshot with. If `None`, starts empty
    ///
    /// # Example
    ///
    /// ```rust
    /// use rcu_cache::config::IncrementalCacheConfig;
    /// use rcu_cache::{HashMap, IncrementalCache};
    ///
    /// let mut seed = HashMap::default();
    /// seed.insert(1i64, "one");
    ///
    /// let cache = IncrementalCache::init(IncrementalCacheConfig::default(), Some(seed));
    /// assert_eq!(cache.get(&1), Some("one"));
    /// ```
    pub fn init(config: IncrementalCacheConfig, initial: Option<HashMap<K, V>>) -> Self {
        Self::from_map(config, initial.unwrap_or_default())
    }
}

impl<K, V, S> IncrementalCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Creates an empty cache with a custom hash builder.
    ///
    /// The hash builder is cloned into the backup store and every published snapshot.
    pub fn init_with_hasher(config: IncrementalCacheConfig, hash_builder: S) -> Self {
        Self::from_snapshot(config, Snapshot::with_hasher(hash_builder))
    }

    /// Creates a cache whose first snapshot is `initial`.
    ///
    /// The map's hash builder is reused for all later snapshots and the backup store.
    pub fn from_map(config: IncrementalCacheConfig, initial: HashMap<K, V, S>) -> Self {
        Self::from_snapshot(config, Snapshot::from_map(initial))
    }

    fn from_snapshot(config: IncrementalCacheConfig, initial: Snapshot<K, V, S>) -> Self {
        let backup = BackupStore::with_hasher(initial.hasher().clone());
        Self {
            slot: SnapshotSlot::new(initial),
            backup,
            max_cas_attempts: config.max_cas_attempts,
            metrics: IncrementalCacheMetrics::new(),
        }
    }

    /// Returns the optimistic attempt budget this cache was built with.
    #[inline]
    pub fn max_cas_attempts(&self) -> usize {
        self.max_cas_attempts
    }

    /// Returns an owned handle to the currently published snapshot.
    ///
    /// Entries that only live in the backup store are not included.
    pub fn snapshot(&self) -> Arc<Snapshot<K, V, S>> {
        self.slot.load_full()
    }

    /// Retrieves a clone of the value stored for `key`.
    ///
    /// Returns `None` if the key is in neither the snapshot nor the backup store.
    /// A backup hit is copied into the snapshot on a best-effort basis so that
    /// later reads stay lock-free. For values that are expensive to clone, use
    /// [`get_with()`](Self::get_with).
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_with(key, V::clone)
    }

    /// Retrieves the value for `key` and applies `f` to it.
    ///
    /// On a snapshot hit `f` runs against the published entry without cloning.
    /// On a backup hit the pair is cloned out of the store, the lock is
    /// released, and promotion is attempted before `f` runs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rcu_cache::config::IncrementalCacheConfig;
    /// use rcu_cache::StrCache;
    ///
    /// let cache: StrCache<String> = StrCache::init(IncrementalCacheConfig::default(), None);
    /// cache.set("greeting".to_string(), "hello world".to_string());
    ///
    /// assert_eq!(cache.get_with("greeting", |v| v.len()), Some(11));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.metrics.record_request();
        {
            let snapshot = self.slot.load();
            if let Some(value) = snapshot.get(key) {
                self.metrics.record_snapshot_hit();
                return Some(f(value));
            }
        }

        if !self.backup.is_active() {
            return None;
        }
        self.metrics.record_backup_read();
        let (key, value) = self.backup.get_cloned(key)?;
        self.metrics.record_backup_hit();

        let result = f(&value);
        self.promote(key, value);
        Some(result)
    }

    /// Stores `value` for `key` unless the key already has a value.
    ///
    /// Returns `true` if the key was already present, in which case nothing
    /// changes. Returns `false` if this call recorded the value. Never fails.
    ///
    /// The write is first attempted up to `max_cas_attempts` times as a
    /// lock-free copy-update of the snapshot; after that it goes to the
    /// backup store under its exclusive lock.
    pub fn set(&self, key: K, value: V) -> bool {
        match self.try_publish(&key, &value, Origin::Write) {
            Publish::Published => false,
            Publish::Existed => true,
            Publish::Exhausted => self.store_in_backup(key, value),
        }
    }

    /// Returns every entry currently cached in either store.
    ///
    /// Not a consistent cut: writes racing with the dump may or may not be
    /// included. Every write that completed before the call is.
    pub fn dump(&self) -> HashMap<K, V, S> {
        let snapshot = self.slot.load_full();
        let mut entries =
            HashMap::with_capacity_and_hasher(snapshot.len(), snapshot.hasher().clone());

        if self.backup.is_active() {
            let backup = self.backup.read();
            self.metrics.record_backup_read();
            entries.reserve(backup.len());
            for (k, v) in backup.iter() {
                entries.insert(k.clone(), v.clone());
            }
        }
        for (k, v) in snapshot.iter() {
            entries.insert(k.clone(), v.clone());
        }

        entries
    }

    /// Checks whether `key` has a value, without promoting it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.slot.load().contains_key(key) {
            return true;
        }
        if !self.backup.is_active() {
            return false;
        }
        self.metrics.record_backup_read();
        self.backup.read().contains_key(key)
    }

    /// Returns the number of distinct keys across both stores.
    ///
    /// Under concurrent writes the result may be slightly stale.
    pub fn len(&self) -> usize {
        let snapshot = self.slot.load();
        let mut len = snapshot.len();
        if self.backup.is_active() {
            let backup = self.backup.read();
            self.metrics.record_backup_read();
            len += backup.keys().filter(|k| !snapshot.contains_key(*k)).count();
        }
        len
    }

    /// Returns `true` if no key has been cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries held by the backup store.
    ///
    /// Promoted entries stay in the backup store as well, so this only grows.
    pub fn backup_len(&self) -> usize {
        if !self.backup.is_active() {
            return 0;
        }
        self.metrics.record_backup_read();
        self.backup.read().len()
    }

    /// Returns a copy of the cache's operation counters.
    pub fn stats(&self) -> IncrementalCacheStats {
        self.metrics.stats()
    }

    /// Copies a backup entry into the snapshot. Failure leaves it in the backup.
    fn promote(&self, key: K, value: V) {
        let outcome = self.try_publish(&key, &value, Origin::Promotion);
        if outcome == Publish::Published {
            self.metrics.record_promotion();
        }
        tracing::trace!(?outcome, "backup entry promotion");
    }

    /// The copy-update engine: up to `max_cas_attempts` optimistic publishes.
    fn try_publish(&self, key: &K, value: &V, origin: Origin) -> Publish {
        for _ in 0..self.max_cas_attempts {
            // Load before reading the flag: a snapshot published by the first
            // overflow writer implies the flag is already visible.
            let current = self.slot.load_full();
            // Snapshot entries are final, so a hit needs no lock even when the
            // backup store is active.
            if current.contains_key(key) {
                return Publish::Existed;
            }
            let attempt = if self.backup.is_active() {
                let backup = self.backup.read();
                self.metrics.record_backup_read();
                if origin == Origin::Write && backup.contains_key(key) {
                    return Publish::Existed;
                }
                // `current` may predate the activation retire; publish against
                // what is installed now that overflow writers are excluded.
                let locked = self.slot.load_full();
                self.copy_update(&locked, key, value)
            } else {
                self.copy_update(&current, key, value)
            };

            if let Some(outcome) = attempt {
                return outcome;
            }
        }
        Publish::Exhausted
    }

    /// One copy-update attempt against `current`. `None` means the CAS lost.
    fn copy_update(
        &self,
        current: &Arc<Snapshot<K, V, S>>,
        key: &K,
        value: &V,
    ) -> Option<Publish> {
        if current.contains_key(key) {
            return Some(Publish::Existed);
        }
        let Some(next) = current.with_entry(key, value) else {
            self.metrics.record_duplicate_abort();
            return Some(Publish::Existed);
        };

        if self.slot.publish(current, Arc::new(next)) {
            self.metrics.record_publish();
            Some(Publish::Published)
        } else {
            self.metrics.record_cas_failure();
            None
        }
    }

    /// The overflow path: insert under the exclusive lock.
    fn store_in_backup(&self, key: K, value: V) -> bool {
        let mut backup = self.backup.write();
        self.metrics.record_backup_write();

        if self.backup.activate(&backup) {
            tracing::debug!(
                max_cas_attempts = self.max_cas_attempts,
                snapshot_len = self.slot.load().len(),
                "copy-update budget exhausted, activating backup store"
            );
            self.retire_snapshot();
        } else {
            tracing::trace!(
                max_cas_attempts = self.max_cas_attempts,
                "copy-update budget exhausted, writing to backup store"
            );
        }

        if self.slot.load().contains_key(&key) {
            return true;
        }
        let existed = insert_if_absent(&mut *backup, key, value);
        if !existed {
            self.metrics.record_backup_insert();
        }
        existed
    }

    /// Republishes the current snapshot under a fresh pointer so that every
    /// publisher that read the backup flag as inactive loses its CAS.
    ///
    /// Runs once, under the exclusive lock, when the backup store is activated.
    fn retire_snapshot(&self) {
        loop {
            let current = self.slot.load_full();
            let successor = Arc::new(Snapshot::clone(&current));
            if self.slot.publish(&current, successor) {
                return;
            }
        }
    }
}

impl<K, V, S> CacheMetrics for IncrementalCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.metrics.to_btreemap();
        metrics.insert("snapshot_entries".into(), self.slot.load().len() as f64);
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        "IncRCU"
    }
}

impl<K, V, S> fmt::Debug for IncrementalCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalCache")
            .field("snapshot", &self.slot)
            .field("backup", &self.backup)
            .field("max_cas_attempts", &self.max_cas_attempts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn make_cache<K: Hash + Eq + Clone, V: Clone>(
        max_cas_attempts: usize,
    ) -> IncrementalCache<K, V> {
        IncrementalCache::init(IncrementalCacheConfig { max_cas_attempts }, None)
    }

    #[test]
    fn test_basic_operations() {
        let cache: IncrementalCache<String, i32> = make_cache(16);

        assert!(cache.is_empty());
        assert!(!cache.set("a".to_string(), 1));
        assert!(!cache.set("b".to_string(), 2));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), None);
        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("c"));
    }

    #[test]
    fn test_set_existing_key_is_noop() {
        let cache: IncrementalCache<i64, &str> = make_cache(16);

        assert!(!cache.set(7, "first"));
        assert!(cache.set(7, "second"));
        assert_eq!(cache.get(&7), Some("first"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_initial_mapping_is_first_snapshot() {
        let mut seed = HashMap::default();
        seed.insert(1i64, 10);
        seed.insert(2i64, 20);

        let cache = IncrementalCache::init(IncrementalCacheConfig::default(), Some(seed));
        assert_eq!(cache.snapshot().len(), 2);
        assert!(cache.set(1, 99));
        assert_eq!(cache.get(&1), Some(10));
    }

    #[test]
    fn test_cached_empty_value_is_not_a_miss() {
        let cache: IncrementalCache<String, Option<u8>> = make_cache(16);

        cache.set("none".to_string(), None);
        assert_eq!(cache.get("none"), Some(None));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_optimistic_path_avoids_backup() {
        let cache: IncrementalCache<i64, i64> = make_cache(8);
        for i in 0..32 {
            cache.set(i, i * 2);
        }

        let stats = cache.stats();
        assert_eq!(stats.snapshot_publishes, 32);
        assert_eq!(stats.backup_writes, 0);
        assert_eq!(stats.backup_reads, 0);
        assert_eq!(cache.backup_len(), 0);
        assert_eq!(cache.snapshot().len(), 32);
    }

    #[test]
    fn test_zero_budget_routes_through_backup() {
        let cache: IncrementalCache<i64, i64> = make_cache(0);

        assert!(!cache.set(1, 10));
        assert!(cache.set(1, 11));
        assert!(!cache.set(2, 20));

        let stats = cache.stats();
        assert_eq!(stats.snapshot_publishes, 0);
        assert_eq!(stats.backup_writes, 3);
        assert_eq!(stats.backup_inserts, 2);

        assert!(cache.snapshot().is_empty());
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&2), Some(20));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_budget_respects_initial_snapshot() {
        let mut seed = HashMap::default();
        seed.insert("k".to_string(), 1);
        let config = IncrementalCacheConfig {
            max_cas_attempts: 0,
        };
        let cache = IncrementalCache::init(config, Some(seed));

        assert!(cache.set("k".to_string(), 2));
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.backup_len(), 0);
    }

    #[test]
    fn test_backup_hit_is_promoted() {
        let cache: IncrementalCache<String, i32> = make_cache(4);

        assert!(!cache.store_in_backup("a".to_string(), 1));
        assert!(!cache.snapshot().contains_key("a"));

        assert_eq!(cache.get("a"), Some(1));
        let after_first = cache.stats();
        assert_eq!(after_first.backup_hits, 1);
        assert_eq!(after_first.promotions, 1);
        assert!(cache.snapshot().contains_key("a"));

        for _ in 0..10 {
            assert_eq!(cache.get("a"), Some(1));
        }
        let after_more = cache.stats();
        assert_eq!(after_more.backup_reads, after_first.backup_reads);
        assert_eq!(after_more.snapshot_hits, after_first.snapshot_hits + 10);

        // Promotion copies; the backup keeps its entry.
        assert_eq!(cache.backup_len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_existing_snapshot_key_skips_backup_lock() {
        let cache: IncrementalCache<i64, i64> = make_cache(4);
        assert!(!cache.set(1, 10));
        assert!(!cache.store_in_backup(2, 20));

        let before = cache.stats();
        for _ in 0..100 {
            assert!(cache.set(1, 11));
        }
        let after = cache.stats();
        assert_eq!(after.backup_reads, before.backup_reads);
        assert_eq!(after.backup_writes, before.backup_writes);

        // A fresh key still consults the active backup store once.
        assert!(!cache.set(3, 30));
        assert_eq!(cache.stats().backup_reads, after.backup_reads + 1);
        assert_eq!(cache.get(&1), Some(10));
    }

    #[test]
    fn test_concurrent_reads_count_exactly() {
        let cache: IncrementalCache<usize, usize> = make_cache(16);
        cache.set(1, 1);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        assert_eq!(cache.get(&1), Some(1));
                        assert_eq!(cache.get(&2), None);
                    }
                });
            }
        });

        let stats = cache.stats();
        assert_eq!(stats.requests, 16_000);
        assert_eq!(stats.snapshot_hits, 8_000);
        assert_eq!(stats.misses(), 8_000);
    }

    #[test]
    fn test_zero_budget_never_promotes() {
        let cache: IncrementalCache<i64, i64> = make_cache(0);
        cache.set(3, 30);

        for _ in 0..5 {
            assert_eq!(cache.get(&3), Some(30));
        }
        let stats = cache.stats();
        assert_eq!(stats.promotions, 0);
        assert_eq!(stats.backup_hits, 5);
    }

    #[test]
    fn test_optimistic_write_sees_backup_entry() {
        let cache: IncrementalCache<String, i32> = make_cache(4);

        cache.store_in_backup("k".to_string(), 1);
        assert!(cache.set("k".to_string(), 2));
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.dump().get("k"), Some(&1));
    }

    #[test]
    fn test_overflow_write_sees_snapshot_entry() {
        let cache: IncrementalCache<String, i32> = make_cache(4);

        assert!(!cache.set("k".to_string(), 1));
        assert!(cache.store_in_backup("k".to_string(), 2));
        assert_eq!(cache.backup_len(), 0);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn test_activation_retires_current_snapshot() {
        let cache: IncrementalCache<i64, i64> = make_cache(4);
        cache.set(1, 1);
        let before = cache.snapshot();

        cache.store_in_backup(2, 2);
        let after = cache.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), before.len());

        // Only the first overflow write retires the snapshot.
        cache.store_in_backup(3, 3);
        assert!(Arc::ptr_eq(&after, &cache.snapshot()));
    }

    #[test]
    fn test_dump_unions_both_stores() {
        let cache: IncrementalCache<i64, i64> = make_cache(4);
        cache.set(1, 10);
        cache.store_in_backup(2, 20);

        let dump = cache.dump();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump.get(&1), Some(&10));
        assert_eq!(dump.get(&2), Some(&20));
    }

    #[test]
    fn test_get_with_avoids_clone_on_snapshot_hit() {
        let cache: StrCache<Vec<u8>> = make_cache(4);
        cache.set("blob".to_string(), vec![0u8; 128]);

        assert_eq!(cache.get_with("blob", |v| v.len()), Some(128));
        assert_eq!(cache.get_with("missing", |v| v.len()), None);
    }

    #[test]
    fn test_i64_cache_alias() {
        let cache: I64Cache<&str> = make_cache(4);
        cache.set(-5, "neg");
        assert_eq!(cache.get(&-5), Some("neg"));
    }

    #[test]
    fn test_init_with_hasher() {
        let cache: IncrementalCache<String, i32, DefaultHashBuilder> =
            IncrementalCache::init_with_hasher(
                IncrementalCacheConfig::default(),
                DefaultHashBuilder::default(),
            );
        cache.set("test".to_string(), 42);
        assert_eq!(cache.get("test"), Some(42));
        assert_eq!(cache.max_cas_attempts(), 1000);
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let cache: IncrementalCache<usize, usize> = make_cache(1000);

        thread::scope(|s| {
            for t in 0..8 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..50 {
                        assert!(!cache.set(t * 50 + i, t));
                    }
                });
            }
        });

        assert_eq!(cache.len(), 400);
        for t in 0..8 {
            assert_eq!(cache.get(&(t * 50)), Some(t));
        }
    }

    #[test]
    fn test_metrics_report() {
        let cache: IncrementalCache<String, i32> = make_cache(4);
        cache.set("a".to_string(), 1);
        let _ = cache.get("a");
        let _ = cache.get("b");

        let metrics = cache.metrics();
        assert_eq!(metrics.get("requests"), Some(&2.0));
        assert_eq!(metrics.get("snapshot_hits"), Some(&1.0));
        assert_eq!(metrics.get("cache_misses"), Some(&1.0));
        assert_eq!(metrics.get("snapshot_entries"), Some(&1.0));
        assert_eq!(cache.algorithm_name(), "IncRCU");
    }

    #[test]
    fn test_debug_output() {
        let cache: IncrementalCache<i64, i64> = make_cache(3);
        let debug = format!("{:?}", cache);
        assert!(debug.contains("IncrementalCache"));
        assert!(debug.contains("max_cas_attempts: 3"));
    }
}
