use core::hash::Hash;

use super::{UpdateContext, UpdateRows};
use crate::{OwnerKey, PersistentCollection, errors::UpdateRowsError};

/// A strategy for collections whose rows are owned elsewhere.
///
/// Inverse sides of associations and immutable collections never have rows
/// updated in place: nothing is diffed and nothing reaches the executor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoOpUpdateRows;

impl<K: Hash + Eq, E> UpdateRows<K, E> for NoOpUpdateRows {
    fn do_update(
        &self,
        _key: &OwnerKey,
        _collection: &PersistentCollection<K, E>,
        _context: &mut UpdateContext<'_>,
    ) -> Result<u64, UpdateRowsError> {
        Ok(0)
    }
}
