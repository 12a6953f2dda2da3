//! Incremental Cache Metrics
//!
//! Counters specific to the incremental read-copy-update cache. They expose
//! which path each operation took: the lock-free snapshot, the optimistic
//! copy-update publish, or the lock-guarded backup store.

use super::striped::StripedCounter;
use super::CacheMetrics;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::BTreeMap;

/// Live counters for an [`IncrementalCache`](crate::IncrementalCache).
///
/// All counters use `Ordering::Relaxed`; they are observational and never
/// order any cache data. The two counters bumped by every snapshot hit are
/// striped per thread so concurrent readers do not write a shared cache line.
#[derive(Debug, Default)]
pub struct IncrementalCacheMetrics {
    requests: StripedCounter,
    snapshot_hits: StripedCounter,
    backup_hits: AtomicU64,
    snapshot_publishes: AtomicU64,
    cas_failures: AtomicU64,
    duplicate_aborts: AtomicU64,
    backup_reads: AtomicU64,
    backup_writes: AtomicU64,
    backup_inserts: AtomicU64,
    promotions: AtomicU64,
}

/// A point-in-time copy of [`IncrementalCacheMetrics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IncrementalCacheStats {
    /// Lookups served by `get` / `get_with`.
    pub requests: u64,
    /// Lookups answered by the snapshot without touching any lock.
    pub snapshot_hits: u64,
    /// Lookups answered by the backup store.
    pub backup_hits: u64,
    /// Successful compare-and-swap publications of a new snapshot.
    pub snapshot_publishes: u64,
    /// Publications lost to a concurrent writer.
    pub cas_failures: u64,
    /// Copies abandoned because the key appeared while copying.
    pub duplicate_aborts: u64,
    /// Shared-lock acquisitions on the backup store.
    pub backup_reads: u64,
    /// Exclusive-lock acquisitions on the backup store.
    pub backup_writes: u64,
    /// New keys recorded in the backup store.
    pub backup_inserts: u64,
    /// Backup entries copied into the snapshot.
    pub promotions: u64,
}

impl IncrementalCacheMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup.
    #[inline]
    pub fn record_request(&self) {
        self.requests.increment();
    }

    /// Records a lookup served from the snapshot.
    #[inline]
    pub fn record_snapshot_hit(&self) {
        self.snapshot_hits.increment();
    }

    /// Records a lookup served from the backup store.
    #[inline]
    pub fn record_backup_hit(&self) {
        self.backup_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful snapshot publication.
    #[inline]
    pub fn record_publish(&self) {
        self.snapshot_publishes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lost compare-and-swap.
    #[inline]
    pub fn record_cas_failure(&self) {
        self.cas_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a copy abandoned on a duplicate key.
    #[inline]
    pub fn record_duplicate_abort(&self) {
        self.duplicate_aborts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a shared-lock acquisition on the backup store.
    #[inline]
    pub fn record_backup_read(&self) {
        self.backup_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an exclusive-lock acquisition on the backup store.
    #[inline]
    pub fn record_backup_write(&self) {
        self.backup_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a new key stored in the backup store.
    #[inline]
    pub fn record_backup_insert(&self) {
        self.backup_inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a backup entry promoted into the snapshot.
    #[inline]
    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a copy of every counter.
    ///
    /// Counters are read one by one, so under concurrent traffic the copy is
    /// not a consistent cut.
    pub fn stats(&self) -> IncrementalCacheStats {
        IncrementalCacheStats {
            requests: self.requests.sum(),
            snapshot_hits: self.snapshot_hits.sum(),
            backup_hits: self.backup_hits.load(Ordering::Relaxed),
            snapshot_publishes: self.snapshot_publishes.load(Ordering::Relaxed),
            cas_failures: self.cas_failures.load(Ordering::Relaxed),
            duplicate_aborts: self.duplicate_aborts.load(Ordering::Relaxed),
            backup_reads: self.backup_reads.load(Ordering::Relaxed),
            backup_writes: self.backup_writes.load(Ordering::Relaxed),
            backup_inserts: self.backup_inserts.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
        }
    }

    /// Converts the counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        self.stats().to_btreemap()
    }
}

impl IncrementalCacheStats {
    /// Lookups that found nothing in either store.
    pub fn misses(&self) -> u64 {
        self.requests
            .saturating_sub(self.snapshot_hits)
            .saturating_sub(self.backup_hits)
    }

    /// Fraction of lookups that found a value, or 0.0 without requests.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.snapshot_hits + self.backup_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups served lock-free by the snapshot, or 0.0 without requests.
    pub fn snapshot_hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.snapshot_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the stats to a BTreeMap with deterministic key ordering.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("snapshot_hits".to_string(), self.snapshot_hits as f64);
        metrics.insert("backup_hits".to_string(), self.backup_hits as f64);
        metrics.insert("cache_misses".to_string(), self.misses() as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("snapshot_hit_rate".to_string(), self.snapshot_hit_rate());

        metrics.insert(
            "snapshot_publishes".to_string(),
            self.snapshot_publishes as f64,
        );
        metrics.insert("cas_failures".to_string(), self.cas_failures as f64);
        metrics.insert("duplicate_aborts".to_string(), self.duplicate_aborts as f64);

        metrics.insert("backup_reads".to_string(), self.backup_reads as f64);
        metrics.insert("backup_writes".to_string(), self.backup_writes as f64);
        metrics.insert("backup_inserts".to_string(), self.backup_inserts as f64);
        metrics.insert("promotions".to_string(), self.promotions as f64);

        metrics
    }
}

impl CacheMetrics for IncrementalCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "IncRCU"
    }
}
