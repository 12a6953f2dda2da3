//! Striped counters for the snapshot read path.
//!
//! A single shared `AtomicU64` bounces its cache line between every core that
//! increments it. The read path records on every lookup, so its counters are
//! split into cache-line-aligned cells; each thread increments the cell it was
//! assigned on first use, and reads add all cells up.

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const STRIPES: usize = 16;

#[derive(Debug, Default)]
#[repr(align(128))]
struct Cell(AtomicU64);

/// A relaxed counter spread over [`STRIPES`] cache lines.
#[derive(Debug, Default)]
pub(crate) struct StripedCounter {
    cells: [Cell; STRIPES],
}

impl StripedCounter {
    #[inline]
    pub(crate) fn increment(&self) {
        self.cells[stripe()].0.fetch_add(1, Ordering::Relaxed);
    }

    /// Sum of all cells. Not a consistent cut under concurrent increments.
    pub(crate) fn sum(&self) -> u64 {
        self.cells.iter().map(|c| c.0.load(Ordering::Relaxed)).sum()
    }
}

/// Index of the calling thread's cell, assigned round-robin on first use.
#[inline]
fn stripe() -> usize {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    std::thread_local! {
        static STRIPE: usize = NEXT.fetch_add(1, Ordering::Relaxed) % STRIPES;
    }
    // Falls back to cell 0 while thread-local storage is being torn down.
    STRIPE.try_with(|s| *s).unwrap_or(0)
}
