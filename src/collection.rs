//! Persistent collection wrappers: a loaded snapshot plus the live state.
//!
//! Both sides are insertion-ordered maps from index (list position or map
//! key) to element. The current state's iteration order is the collection's
//! natural order and drives the order in which changed rows are updated.

use core::fmt::Debug;
use core::hash::Hash;

use indexmap::IndexMap as IndexMapRaw;

/// `IndexMap` alias using hashbrown's default hasher for `no_std` compatibility.
pub type IndexMap<K, V> = IndexMapRaw<K, V, hashbrown::DefaultHashBuilder>;

/// A collection attribute whose rows were loaded from storage.
///
/// The wrapper owns both its snapshot and its current state; coordinators
/// only ever borrow it immutably. Callers must hold the unit of work
/// exclusively while a coordinator reads it, and call
/// [`PersistentCollection::post_flush`] once the rows have been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentCollection<K: Hash + Eq, E> {
    snapshot: IndexMap<K, E>,
    current: IndexMap<K, E>,
    dirty: bool,
}

/// A list: elements indexed by position.
pub type PersistentList<E> = PersistentCollection<usize, E>;

/// A map: elements indexed by key.
pub type PersistentMap<K, E> = PersistentCollection<K, E>;

impl<K: Hash + Eq, E> Default for PersistentCollection<K, E> {
    fn default() -> Self {
        Self {
            snapshot: IndexMap::default(),
            current: IndexMap::default(),
            dirty: false,
        }
    }
}

impl<K: Hash + Eq + Clone, E: Clone> PersistentCollection<K, E> {
    /// A collection as just loaded: its snapshot equals its state.
    #[must_use]
    pub fn loaded(entries: impl IntoIterator<Item = (K, E)>) -> Self {
        let current: IndexMap<K, E> = entries.into_iter().collect();
        Self {
            snapshot: current.clone(),
            current,
            dirty: false,
        }
    }

    /// Makes the current state the new snapshot.
    ///
    /// Call only after the rows of this collection were successfully written.
    pub fn post_flush(&mut self) {
        self.snapshot.clone_from(&self.current);
        self.dirty = false;
    }
}

impl<K: Hash + Eq, E> PersistentCollection<K, E> {
    /// A new, never persisted collection: every entry is an insert.
    #[must_use]
    pub fn transient() -> Self {
        Self::default()
    }

    /// The state as loaded at the start of the unit of work.
    #[must_use]
    pub fn snapshot(&self) -> &IndexMap<K, E> {
        &self.snapshot
    }

    /// The live state.
    #[must_use]
    pub fn entries(&self) -> &IndexMap<K, E> {
        &self.current
    }

    /// Element at `index`, if present.
    #[must_use]
    pub fn get(&self, index: &K) -> Option<&E> {
        self.current.get(index)
    }

    /// Mutable element at `index`; marks the collection dirty when present.
    pub fn get_mut(&mut self, index: &K) -> Option<&mut E> {
        let element = self.current.get_mut(index);
        self.dirty |= element.is_some();
        element
    }

    /// Inserts or replaces the element at `index`, returning the replaced one.
    pub fn insert(&mut self, index: K, element: E) -> Option<E> {
        self.dirty = true;
        self.current.insert(index, element)
    }

    /// Removes the element at `index`, preserving the order of the others.
    pub fn remove(&mut self, index: &K) -> Option<E> {
        let removed = self.current.shift_remove(index);
        self.dirty |= removed.is_some();
        removed
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the live state is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Whether the live state was touched since the last baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl<E> PersistentCollection<usize, E> {
    /// Appends an element one past the highest live position.
    ///
    /// Positions freed by [`PersistentCollection::remove`] are not reused, so
    /// a push never replaces a live element.
    pub fn push(&mut self, element: E) {
        let position = self.current.keys().max().map_or(0, |last| last + 1);
        self.insert(position, element);
    }

    /// Replaces the element at `position`, returning the previous one.
    ///
    /// Returns `None` and leaves the list untouched when `position` is out of range.
    pub fn set(&mut self, position: usize, element: E) -> Option<E> {
        let slot = self.get_mut(&position)?;
        Some(core::mem::replace(slot, element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;

    fn list(values: &[&str]) -> PersistentList<String> {
        PersistentList::loaded(values.iter().map(|v| String::from(*v)).enumerate())
    }

    #[test]
    fn test_loaded_collection_is_clean() {
        let values = list(&["a", "b"]);
        assert!(!values.is_dirty());
        assert_eq!(values.snapshot(), values.entries());
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_set_marks_dirty_and_keeps_snapshot() {
        let mut values = list(&["a", "b"]);
        assert_eq!(values.set(1, "c".into()), Some("b".into()));
        assert!(values.is_dirty());
        assert_eq!(values.snapshot().get(&1).map(String::as_str), Some("b"));
        assert_eq!(values.get(&1).map(String::as_str), Some("c"));
    }

    #[test]
    fn test_set_out_of_range_is_a_no_op() {
        let mut values = list(&["a"]);
        assert_eq!(values.set(5, "z".into()), None);
        assert!(!values.is_dirty());
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_push_appends_at_next_position() {
        let mut values = list(&["a"]);
        values.push("b".into());
        let keys: Vec<usize> = values.entries().keys().copied().collect();
        assert_eq!(keys, [0, 1]);
        assert!(values.snapshot().get(&1).is_none());
    }

    #[test]
    fn test_push_after_remove_keeps_live_elements() {
        let mut values = list(&["a", "b", "c"]);
        values.remove(&1);
        values.push("d".into());

        assert_eq!(values.len(), 3);
        assert_eq!(values.get(&2).map(String::as_str), Some("c"));
        assert_eq!(values.get(&3).map(String::as_str), Some("d"));
        // "c" is untouched, so nothing looks like an in-place change.
        assert!(
            values
                .entries()
                .iter()
                .all(|(position, value)| values.snapshot().get(position).is_none_or(|old| old == value))
        );
    }

    #[test]
    fn test_post_flush_rebaselines() {
        let mut values = list(&["a"]);
        values.set(0, "b".into());
        values.post_flush();
        assert!(!values.is_dirty());
        assert_eq!(values.snapshot().get(&0).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: PersistentMap<&str, i64> =
            PersistentMap::loaded([("x", 1), ("y", 2), ("z", 3)]);
        assert_eq!(map.remove(&"y"), Some(2));
        let keys: Vec<&str> = map.entries().keys().copied().collect();
        assert_eq!(keys, ["x", "z"]);
        assert!(map.is_dirty());
        assert!(!PersistentMap::<&str, i64>::transient().is_dirty());
    }
}
