//! Immutable snapshots and the atomically swappable slot that publishes them.
//!
//! A [`Snapshot`] is one frozen version of the cached mapping. Once a snapshot is
//! installed in a [`SnapshotSlot`] it is never mutated again; writers build a
//! successor and swap it in with a compare-and-swap on the slot.
//!
//! ```text
//!            load() (lock-free)
//!   reader ───────────────────────▶ ┌──────────────┐      ┌────────────┐
//!                                    │ SnapshotSlot │ ───▶ │ Snapshot N │
//!   writer ── publish(N, N+1) ─────▶ └──────────────┘      └────────────┘
//!                 │                                              │ copy + 1 pair
//!                 └───────────── CAS succeeds iff slot still ◀───┘
//!                                points at Snapshot N
//! ```

use crate::{DefaultHashBuilder, HashMap};
use arc_swap::{ArcSwap, Guard};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// One immutable version of the cached key-value mapping.
///
/// Snapshots are only ever reachable through a [`SnapshotSlot`] or an `Arc`
/// handed out by one, so a reader always sees a fully formed map.
#[derive(Clone)]
pub struct Snapshot<K, V, S = DefaultHashBuilder> {
    map: HashMap<K, V, S>,
}

impl<K, V, S> Snapshot<K, V, S> {
    /// Wraps an existing map as a snapshot.
    pub fn from_map(map: HashMap<K, V, S>) -> Self {
        Self { map }
    }

    /// Returns the number of entries in this snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the snapshot holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over every entry of the snapshot in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }

    /// Returns the hash builder shared by this snapshot's map.
    pub fn hasher(&self) -> &S {
        self.map.hasher()
    }
}

impl<K, V, S> Snapshot<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty snapshot using the given hash builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: HashMap::with_hasher(hash_builder),
        }
    }

    /// Looks up the value stored for `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key)
    }

    /// Returns `true` if `key` is present in this snapshot.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }
}

impl<K, V, S> Snapshot<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Builds the successor of this snapshot: every existing entry plus `(key, value)`.
    ///
    /// Returns `None` when `key` turns up while copying, in which case no
    /// successor may be published for it.
    pub(crate) fn with_entry(&self, key: &K, value: &V) -> Option<Self> {
        let mut map =
            HashMap::with_capacity_and_hasher(self.map.len() + 1, self.map.hasher().clone());
        for (k, v) in self.map.iter() {
            if k == key {
                return None;
            }
            map.insert(k.clone(), v.clone());
        }
        map.insert(key.clone(), value.clone());
        Some(Self { map })
    }
}

impl<K, V, S> Default for Snapshot<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            map: HashMap::with_hasher(S::default()),
        }
    }
}

impl<K, V, S> fmt::Debug for Snapshot<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot").field("len", &self.map.len()).finish()
    }
}

/// The single atomically swappable reference to the current [`Snapshot`].
///
/// The slot is never empty: it is created with a snapshot and every mutation
/// replaces one snapshot with another.
pub struct SnapshotSlot<K, V, S = DefaultHashBuilder> {
    current: ArcSwap<Snapshot<K, V, S>>,
}

impl<K, V, S> SnapshotSlot<K, V, S> {
    /// Creates a slot holding `snapshot`.
    pub fn new(snapshot: Snapshot<K, V, S>) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Returns a short-lived guard to the current snapshot.
    ///
    /// A single atomic read; it neither blocks nor allocates. Keep the guard for
    /// the duration of one lookup only, use [`load_full`](Self::load_full) to hold on
    /// to a snapshot.
    #[inline]
    pub fn load(&self) -> Guard<Arc<Snapshot<K, V, S>>> {
        self.current.load()
    }

    /// Returns an owned handle to the current snapshot.
    #[inline]
    pub fn load_full(&self) -> Arc<Snapshot<K, V, S>> {
        self.current.load_full()
    }

    /// Replaces the current snapshot with `new` iff the slot still points at `old`.
    ///
    /// Returns whether the swap happened. Comparison is by pointer identity.
    pub fn publish(&self, old: &Arc<Snapshot<K, V, S>>, new: Arc<Snapshot<K, V, S>>) -> bool {
        let prev = self.current.compare_and_swap(old, new);
        Arc::ptr_eq(&prev, old)
    }
}

impl<K, V, S> fmt::Debug for SnapshotSlot<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSlot")
            .field("len", &self.current.load().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(pairs: &[(i64, i32)]) -> Snapshot<i64, i32> {
        Snapshot::from_map(pairs.iter().copied().collect())
    }

    #[test]
    fn test_with_entry_copies_and_extends() {
        let base = snapshot_of(&[(1, 10), (2, 20)]);
        let next = base.with_entry(&3, &30).unwrap();

        assert_eq!(base.len(), 2);
        assert_eq!(next.len(), 3);
        assert_eq!(next.get(&1), Some(&10));
        assert_eq!(next.get(&3), Some(&30));
        assert!(!base.contains_key(&3));
    }

    #[test]
    fn test_with_entry_rejects_duplicate() {
        let base = snapshot_of(&[(1, 10)]);
        assert!(base.with_entry(&1, &99).is_none());
        assert_eq!(base.get(&1), Some(&10));
    }

    #[test]
    fn test_default_is_empty() {
        let snap: Snapshot<String, i32> = Snapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.get("missing"), None);
    }

    #[test]
    fn test_with_hasher_starts_empty() {
        let snap: Snapshot<i64, i32> = Snapshot::with_hasher(DefaultHashBuilder::default());
        assert!(snap.is_empty());
        let next = snap.with_entry(&1, &1).unwrap();
        assert_eq!(next.get(&1), Some(&1));
    }

    #[test]
    fn test_publish_succeeds_against_current() {
        let slot = SnapshotSlot::new(snapshot_of(&[]));
        let old = slot.load_full();
        let new = Arc::new(old.with_entry(&7, &70).unwrap());

        assert!(slot.publish(&old, Arc::clone(&new)));
        assert!(Arc::ptr_eq(&slot.load_full(), &new));
        assert_eq!(slot.load().get(&7), Some(&70));
    }

    #[test]
    fn test_publish_fails_against_stale_snapshot() {
        let slot = SnapshotSlot::new(snapshot_of(&[]));
        let stale = slot.load_full();

        let first = Arc::new(stale.with_entry(&1, &1).unwrap());
        assert!(slot.publish(&stale, first));

        let second = Arc::new(stale.with_entry(&2, &2).unwrap());
        assert!(!slot.publish(&stale, second));

        let current = slot.load();
        assert!(current.contains_key(&1));
        assert!(!current.contains_key(&2));
    }

    #[test]
    fn test_publish_identical_content_is_a_new_version() {
        let slot = SnapshotSlot::new(snapshot_of(&[(1, 1)]));
        let old = slot.load_full();
        let copy = Arc::new((*old).clone());

        assert!(slot.publish(&old, copy));
        assert!(!Arc::ptr_eq(&slot.load_full(), &old));
    }
}
