//! Row updates for collections of embeddables.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::Hash;

use super::{UpdateContext, UpdateRows, batch::RowBatcher, join_table::check_span};
use crate::{
    MutationTarget, OwnerKey, PersistentCollection, RowMutationOperation,
    diff::diff,
    errors::{ConfigurationError, UpdateRowsError},
    mapping::{ColumnSpan, CompositeElement, ElementMapping, IndexMapping},
};

/// Updates the rows of embeddable elements flattened into several columns.
///
/// The element mapping covers every value column of the target, read-only
/// ones included, so that change detection sees the whole embeddable. Only
/// the updatable columns end up in the SET clause.
#[derive(Debug)]
pub struct CompositeUpdateRows<I, E> {
    operation: Arc<RowMutationOperation>,
    index: I,
    element: CompositeElement<E>,
}

impl<I: ColumnSpan, E> CompositeUpdateRows<I, E> {
    /// Builds the operation of `target` and wraps the mappings around it.
    ///
    /// # Errors
    ///
    /// * `InverseTarget` - If `target` is inverse.
    /// * `NoUpdatableColumns` - If every value column of `target` is read-only.
    /// * `MappingSpan` - If a mapping does not match the target's columns.
    pub fn for_target(
        target: &MutationTarget,
        index: I,
        element: CompositeElement<E>,
    ) -> Result<Self, ConfigurationError> {
        Self::new(Arc::new(RowMutationOperation::build(target)?), index, element)
    }

    /// Wraps the mappings around an already built operation.
    ///
    /// # Errors
    ///
    /// * `MappingSpan` - If the index does not cover the index columns, or the
    ///   embeddable does not cover every value column.
    pub fn new(
        operation: Arc<RowMutationOperation>,
        index: I,
        element: CompositeElement<E>,
    ) -> Result<Self, ConfigurationError> {
        check_span(&operation, "index", operation.index_columns().len(), &index)?;
        check_span(&operation, "value", operation.value_mask().len(), &element)?;
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

impl<K, E, I> UpdateRows<K, E> for CompositeUpdateRows<I, E>
where
    K: Hash + Eq,
    I: IndexMapping<K>,
{
    fn do_update(
        &self,
        key: &OwnerKey,
        collection: &PersistentCollection<K, E>,
        context: &mut UpdateContext<'_>,
    ) -> Result<u64, UpdateRowsError> {
        let mask = self.operation.value_mask();
        let mut batcher = RowBatcher::new(&self.operation, key, context);
        let mut row = Vec::with_capacity(mask.len());
        let mut index_values = Vec::with_capacity(self.index.column_span());

        for entry in diff(collection.snapshot(), collection.entries(), &self.element) {
            self.element.disassemble(entry.element, &mut row);
            self.index.disassemble(entry.index, &mut index_values);
            let set_values = row
                .drain(..)
                .zip(mask)
                .filter_map(|(value, &updatable)| updatable.then_some(value));
            batcher.push(set_values, index_values.drain(..))?;
        }
        batcher.finish()
    }
}
