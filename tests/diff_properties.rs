//! Property tests for snapshot differencing and the update path built on it.
//!
//! A map collection is loaded from random entries, edited by a random
//! sequence of puts and removals, and the differencer is checked against a
//! direct model: an entry changed iff its key is in both the snapshot and the
//! current state and its persisted value differs.

use std::num::NonZeroUsize;

use collection_mutation::mapping::{BasicElement, MapKey};
use collection_mutation::{
    BatchError, BatchExecutor, BoundOperation, JoinTableUpdateRows, MutationTarget, OwnerKey,
    PersistentMap, Session, UpdateRowsConfig, UpdateRowsCoordinator, Value, ValueColumn, diff,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Put(u8, String),
    Remove(u8),
}

fn arb_entries() -> impl Strategy<Value = Vec<(u8, String)>> {
    prop::collection::vec((0u8..12, "[a-cA-C]{0,2}"), 0..10)
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0u8..12, "[a-cA-C]{0,2}").prop_map(|(key, value)| Edit::Put(key, value)),
        1 => (0u8..12).prop_map(Edit::Remove),
    ]
}

fn edited(entries: Vec<(u8, String)>, edits: &[Edit]) -> PersistentMap<u8, String> {
    let mut collection = PersistentMap::loaded(entries);
    for edit in edits {
        match edit {
            Edit::Put(key, value) => {
                collection.insert(*key, value.clone());
            }
            Edit::Remove(key) => {
                collection.remove(key);
            }
        }
    }
    collection
}

/// Entries the differencer must yield, in current-state order.
fn model(collection: &PersistentMap<u8, String>, same: impl Fn(&str, &str) -> bool) -> Vec<(u8, String)> {
    collection
        .entries()
        .iter()
        .filter(|(key, value)| {
            collection
                .snapshot()
                .get(*key)
                .is_some_and(|old| !same(old.as_str(), value.as_str()))
        })
        .map(|(key, value)| (*key, value.clone()))
        .collect()
}

fn changed(
    collection: &PersistentMap<u8, String>,
    mapping: &BasicElement<impl Fn(&String) -> Value + Send + Sync>,
) -> Vec<(u8, String)> {
    diff(collection.snapshot(), collection.entries(), mapping)
        .map(|entry| (*entry.index, entry.element.clone()))
        .collect()
}

/// Accepts every operation and records its SET values.
#[derive(Default)]
struct Recorder {
    set_values: Vec<Value>,
    batches: usize,
}

impl BatchExecutor for Recorder {
    fn execute_batch(&mut self, batch: &[BoundOperation]) -> Result<Vec<u64>, BatchError> {
        self.batches += 1;
        self.set_values
            .extend(batch.iter().flat_map(|bound| bound.set_values().iter().cloned()));
        Ok(vec![1; batch.len()])
    }
}

proptest! {
    #[test]
    fn diff_matches_model(entries in arb_entries(), edits in prop::collection::vec(arb_edit(), 0..16)) {
        let collection = edited(entries, &edits);
        let mapping = BasicElement::converted(|value: &String| Value::from(value.as_str()));
        prop_assert_eq!(changed(&collection, &mapping), model(&collection, |a, b| a == b));
    }

    #[test]
    fn diff_compares_converted_values(entries in arb_entries(), edits in prop::collection::vec(arb_edit(), 0..16)) {
        let collection = edited(entries, &edits);
        let mapping = BasicElement::converted(|value: &String| Value::Text(value.to_lowercase()));
        prop_assert_eq!(
            changed(&collection, &mapping),
            model(&collection, |a, b| a.eq_ignore_ascii_case(b))
        );
    }

    #[test]
    fn diff_is_empty_after_rebaseline(entries in arb_entries(), edits in prop::collection::vec(arb_edit(), 0..16)) {
        let mut collection = edited(entries, &edits);
        collection.post_flush();
        let mapping = BasicElement::converted(|value: &String| Value::from(value.as_str()));
        prop_assert!(changed(&collection, &mapping).is_empty());
    }

    #[test]
    fn diff_never_yields_inserts_or_deletes(entries in arb_entries(), edits in prop::collection::vec(arb_edit(), 0..16)) {
        let collection = edited(entries, &edits);
        let mapping = BasicElement::converted(|value: &String| Value::from(value.as_str()));
        for (key, _) in changed(&collection, &mapping) {
            prop_assert!(collection.snapshot().contains_key(&key));
            prop_assert!(collection.entries().contains_key(&key));
        }
    }

    #[test]
    fn coordinator_submits_model_rows_in_order(
        entries in arb_entries(),
        edits in prop::collection::vec(arb_edit(), 0..16),
        batch_size in 1usize..5,
    ) {
        let collection = edited(entries, &edits);
        let target = MutationTarget::builder("Bag.items", "Bag_items")
            .key_column("bag_id")
            .index_column("slot")
            .value_column(ValueColumn::new("item"))
            .build()
            .unwrap();
        let slots = MapKey::converted(|slot: &u8| Value::from(u32::from(*slot)));
        let strategy = JoinTableUpdateRows::for_target(&target, slots, BasicElement::direct()).unwrap();
        let config = UpdateRowsConfig::default().with_batch_size(NonZeroUsize::new(batch_size).unwrap());
        let coordinator = UpdateRowsCoordinator::new(target, strategy).with_config(config);

        let mut recorder = Recorder::default();
        let rows = coordinator
            .update_rows_counted(&OwnerKey::from(1i64), &collection, &mut Session::new(&mut recorder))
            .unwrap();

        let expected = model(&collection, |a, b| a == b);
        prop_assert_eq!(rows, expected.len() as u64);
        prop_assert_eq!(recorder.batches, expected.len().div_ceil(batch_size));
        let expected_values: Vec<Value> = expected.into_iter().map(|(_, value)| Value::from(value)).collect();
        prop_assert_eq!(recorder.set_values, expected_values);
    }
}
