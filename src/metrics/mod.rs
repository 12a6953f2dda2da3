//! Cache Metrics System
//!
//! Provides BTreeMap-based metrics reporting for the incremental cache. Counters
//! are relaxed atomics. The ones recorded on every snapshot hit are striped
//! across cache-line-aligned cells, so concurrent readers each write their own
//! line instead of contending on one.
//!
//! # Why BTreeMap over HashMap?
//!
//! - **Deterministic ordering**: Metrics always appear in consistent order
//! - **Reproducible output**: Test assertions and benchmark logs stay stable
//!
//! With a dozen keys the O(log n) lookup cost is irrelevant.

use std::collections::BTreeMap;

pub mod incremental;
mod striped;

pub use incremental::{IncrementalCacheMetrics, IncrementalCacheStats};

/// Trait implemented by caches that report metrics.
///
/// The trait uses BTreeMap to ensure deterministic ordering of metrics.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    ///
    /// Keys are sorted alphabetically for consistent output.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification (e.g. "IncRCU").
    fn algorithm_name(&self) -> &'static str;
}
