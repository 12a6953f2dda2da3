//! Lock-guarded overflow store.
//!
//! Writes land here only after the optimistic copy-update path has used up its
//! attempt budget. The store is a plain map behind a `parking_lot::RwLock`, plus
//! an `active` flag that stays `false` until the first overflow write. While the
//! flag is down the store is known to be empty and readers skip the lock
//! entirely.

use crate::HashMap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) struct BackupStore<K, V, S> {
    map: RwLock<HashMap<K, V, S>>,
    active: AtomicBool,
}

impl<K, V, S> BackupStore<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(hash_builder)),
            active: AtomicBool::new(false),
        }
    }

    /// Returns `true` once any writer has taken the overflow path.
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Raises the `active` flag. Must be called with the exclusive lock held.
    ///
    /// Returns `true` if this call flipped the flag.
    pub(crate) fn activate(&self, _guard: &RwLockWriteGuard<'_, HashMap<K, V, S>>) -> bool {
        !self.active.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V, S>> {
        self.map.read()
    }

    #[inline]
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V, S>> {
        self.map.write()
    }

    /// Looks `key` up under the shared lock and returns owned copies of the pair.
    ///
    /// The lock is released before returning.
    pub(crate) fn get_cloned<Q>(&self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q> + Clone,
        V: Clone,
        Q: ?Sized + Hash + Eq,
    {
        self.map
            .read()
            .get_key_value(key)
            .map(|(k, v)| (k.clone(), v.clone()))
    }
}

/// Inserts `(key, value)` unless `key` is already present. Returns whether it was.
pub(crate) fn insert_if_absent<K, V, S>(map: &mut HashMap<K, V, S>, key: K, value: V) -> bool
where
    K: Hash + Eq,
    S: BuildHasher,
{
    if map.contains_key(&key) {
        return true;
    }
    map.insert(key, value);
    false
}

impl<K, V, S> fmt::Debug for BackupStore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupStore")
            .field("active", &self.active.load(Ordering::Relaxed))
            .field("len", &self.map.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultHashBuilder;

    fn store() -> BackupStore<String, i32, DefaultHashBuilder> {
        BackupStore::with_hasher(DefaultHashBuilder::default())
    }

    #[test]
    fn test_starts_inactive_and_empty() {
        let backup = store();
        assert!(!backup.is_active());
        assert!(backup.read().is_empty());
        assert_eq!(backup.get_cloned("a"), None);
    }

    #[test]
    fn test_activate_flips_once() {
        let backup = store();
        {
            let guard = backup.write();
            assert!(backup.activate(&guard));
            assert!(!backup.activate(&guard));
        }
        assert!(backup.is_active());
    }

    #[test]
    fn test_insert_if_absent_keeps_first_value() {
        let backup = store();
        {
            let mut map = backup.write();
            assert!(!insert_if_absent(&mut *map, "k".to_string(), 1));
            assert!(insert_if_absent(&mut *map, "k".to_string(), 2));
        }
        assert_eq!(backup.get_cloned("k"), Some(("k".to_string(), 1)));
    }
}
