//! Row updates for element collections and join tables.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::Hash;

use super::{UpdateContext, UpdateRows, batch::RowBatcher};
use crate::{
    MutationTarget, OwnerKey, PersistentCollection, RowMutationOperation,
    diff::diff,
    errors::{ConfigurationError, UpdateRowsError},
    mapping::{ColumnSpan, ElementMapping, IndexMapping},
};

/// Updates the value column(s) of rows addressed by owner key and index.
///
/// The element mapping produces exactly the values written by the UPDATE:
/// one per SET column of the operation.
#[derive(Debug, Clone)]
pub struct JoinTableUpdateRows<I, M> {
    operation: Arc<RowMutationOperation>,
    index: I,
    element: M,
}

impl<I: ColumnSpan, M: ColumnSpan> JoinTableUpdateRows<I, M> {
    /// Builds the operation of `target` and wraps the mappings around it.
    ///
    /// # Errors
    ///
    /// * `InverseTarget` - If `target` is inverse.
    /// * `NoUpdatableColumns` - If `target` has nothing to update.
    /// * `MappingSpan` - If a mapping does not match the target's columns.
    pub fn for_target(
        target: &MutationTarget,
        index: I,
        element: M,
    ) -> Result<Self, ConfigurationError> {
        Self::new(Arc::new(RowMutationOperation::build(target)?), index, element)
    }

    /// Wraps the mappings around an already built (possibly cached) operation.
    ///
    /// # Errors
    ///
    /// * `MappingSpan` - If a mapping does not match the operation's columns.
    pub fn new(
        operation: Arc<RowMutationOperation>,
        index: I,
        element: M,
    ) -> Result<Self, ConfigurationError> {
        check_span(&operation, "index", operation.index_columns().len(), &index)?;
        check_span(&operation, "value", operation.set_columns().len(), &element)?;
        Ok(Self {
            operation,
            index,
            element,
        })
    }

    /// The shared operation template.
    #[must_use]
    pub fn operation(&self) -> &Arc<RowMutationOperation> {
        &self.operation
    }
}

pub(super) fn check_span(
    operation: &RowMutationOperation,
    kind: &'static str,
    expected: usize,
    mapping: &impl ColumnSpan,
) -> Result<(), ConfigurationError> {
    let actual = mapping.column_span();
    if actual == expected {
        Ok(())
    } else {
        Err(ConfigurationError::MappingSpan {
            role_path: operation.role_path().into(),
            kind,
            expected,
            actual,
        })
    }
}

impl<K, E, I, M> UpdateRows<K, E> for JoinTableUpdateRows<I, M>
where
    K: Hash + Eq,
    I: IndexMapping<K>,
    M: ElementMapping<E>,
{
    fn do_update(
        &self,
        key: &OwnerKey,
        collection: &PersistentCollection<K, E>,
        context: &mut UpdateContext<'_>,
    ) -> Result<u64, UpdateRowsError> {
        let mut batcher = RowBatcher::new(&self.operation, key, context);
        let mut set_values = Vec::with_capacity(self.element.column_span());
        let mut index_values = Vec::with_capacity(self.index.column_span());

        for entry in diff(collection.snapshot(), collection.entries(), &self.element) {
            self.element.disassemble(entry.element, &mut set_values);
            self.index.disassemble(entry.index, &mut index_values);
            batcher.push(set_values.drain(..), index_values.drain(..))?;
        }
        batcher.finish()
    }
}
