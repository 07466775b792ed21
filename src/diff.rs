//! Snapshot differencing: which collection entries need a row UPDATE.
//!
//! An entry needs an update exactly when its index exists both in the
//! snapshot and in the current state and the mapping says the two elements
//! persist differently. Entries only in the current state belong to the
//! insert path and entries only in the snapshot to the delete path; neither
//! is ever yielded here.

use core::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use crate::mapping::ElementMapping;

/// An entry whose element changed in place.
#[derive(Debug, PartialEq, Eq)]
pub struct ChangedEntry<'a, K, E> {
    /// Position or key of the entry.
    pub index: &'a K,
    /// The element's current value.
    pub element: &'a E,
}

impl<K, E> Clone for ChangedEntry<'_, K, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, E> Copy for ChangedEntry<'_, K, E> {}

/// Lazily yields the entries of `current` that changed relative to `snapshot`.
///
/// Iteration follows `current`'s order. Neither input is modified and no
/// state survives the iterator.
pub fn diff<'a, K, E, M, S>(
    snapshot: &'a IndexMap<K, E, S>,
    current: &'a IndexMap<K, E, S>,
    mapping: &M,
) -> impl Iterator<Item = ChangedEntry<'a, K, E>>
where
    K: Hash + Eq,
    S: BuildHasher,
    M: ElementMapping<E> + ?Sized,
{
    current.iter().filter_map(move |(index, element)| {
        let original = snapshot.get(index)?;
        (!mapping.is_same(original, element)).then_some(ChangedEntry { index, element })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use crate::collection::PersistentList;
    use crate::mapping::BasicElement;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    fn list(values: &[&str]) -> PersistentList<String> {
        PersistentList::loaded(values.iter().map(|v| (*v).to_string()).enumerate())
    }

    fn changed(collection: &PersistentList<String>) -> Vec<(usize, &str)> {
        let mapping = BasicElement::direct();
        diff(collection.snapshot(), collection.entries(), &mapping)
            .map(|entry| (*entry.index, entry.element.as_str()))
            .collect()
    }

    #[test]
    fn test_single_changed_position() {
        let mut values = list(&["a", "b"]);
        values.set(1, "c".into());
        assert_eq!(changed(&values), [(1, "c")]);
    }

    #[test]
    fn test_unchanged_collection_yields_nothing() {
        let values = list(&["a", "b", "c"]);
        assert!(changed(&values).is_empty());
    }

    #[test]
    fn test_inserted_position_is_not_an_update() {
        let mut values = list(&["a"]);
        values.push("z".into());
        assert!(changed(&values).is_empty());
    }

    #[test]
    fn test_removed_position_is_not_an_update() {
        let mut values = list(&["a", "b"]);
        values.remove(&1);
        values.set(0, "x".into());
        assert_eq!(changed(&values), [(0, "x")]);
    }

    #[test]
    fn test_follows_current_iteration_order() {
        let mut values = list(&["a", "b", "c"]);
        // Moving position 0 to the end of the current state's order.
        let first = values.remove(&0).unwrap();
        values.insert(0, first);
        values.set(2, "C".into());
        values.set(0, "A".into());
        assert_eq!(changed(&values), [(2, "C"), (0, "A")]);
    }

    #[test]
    fn test_converter_normalized_values_are_equal() {
        let mut values = list(&["Hello"]);
        values.set(0, "Hello ".into());
        let trimmed = |value: &String| Value::Text(value.trim_end().to_string());
        let mapping = BasicElement::converted(trimmed);
        assert_eq!(
            diff(values.snapshot(), values.entries(), &mapping).count(),
            0
        );
    }
}
