//! Binding changed entries and submitting them to the executor in chunks.

use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{RowCountPolicy, UpdateContext};
use crate::{
    BoundOperation, OwnerKey, RowMutationOperation, Value, diagnostics::TRACING_TARGET,
    errors::UpdateRowsError,
};

/// Accumulates bound operations of one call and submits them `batch_size` at a time.
///
/// Operation positions in errors count from the first operation of the call,
/// not of the chunk.
pub(super) struct RowBatcher<'b, 'c> {
    operation: &'b Arc<RowMutationOperation>,
    owner_key: &'b OwnerKey,
    context: &'b mut UpdateContext<'c>,
    pending: Vec<BoundOperation>,
    submitted: usize,
    rows: u64,
}

impl<'b, 'c> RowBatcher<'b, 'c> {
    pub(super) fn new(
        operation: &'b Arc<RowMutationOperation>,
        owner_key: &'b OwnerKey,
        context: &'b mut UpdateContext<'c>,
    ) -> Self {
        let capacity = context.config.batch_size().get();
        Self {
            operation,
            owner_key,
            context,
            pending: Vec::with_capacity(capacity),
            submitted: 0,
            rows: 0,
        }
    }

    /// Binds one changed row: SET values, then the owner key, then the index.
    pub(super) fn push(
        &mut self,
        set_values: impl IntoIterator<Item = Value>,
        index_values: impl IntoIterator<Item = Value>,
    ) -> Result<(), UpdateRowsError> {
        let mut parameters = Vec::with_capacity(self.operation.parameter_count());
        parameters.extend(set_values);
        parameters.extend(self.owner_key.values().iter().cloned());
        parameters.extend(index_values);

        let actual = parameters.len();
        let bound = self
            .operation
            .bind(parameters)
            .ok_or_else(|| UpdateRowsError::Binding {
                role_path: self.operation.role_path().to_string(),
                owner_key: self.owner_key.clone(),
                expected: self.operation.parameter_count(),
                actual,
            })?;
        tracing::trace!(target: TRACING_TARGET, statement = %bound, "Bound collection row update");

        self.pending.push(bound);
        if self.pending.len() >= self.context.config.batch_size().get() {
            self.flush()?;
        }
        Ok(())
    }

    /// Submits whatever is pending and returns the total updated row count.
    pub(super) fn finish(mut self) -> Result<u64, UpdateRowsError> {
        self.flush()?;
        Ok(self.rows)
    }

    fn flush(&mut self) -> Result<(), UpdateRowsError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        tracing::trace!(
            target: TRACING_TARGET,
            role = self.operation.role_path(),
            key = %self.owner_key,
            operations = self.pending.len(),
            first = self.submitted,
            "Submitting collection row batch"
        );

        let counts = self
            .context
            .executor
            .execute_batch(&self.pending)
            .map_err(|error| UpdateRowsError::Execution {
                role_path: self.operation.role_path().to_string(),
                owner_key: self.owner_key.clone(),
                operation: self.submitted + error.index,
                source: error.source,
            })?;

        if counts.len() != self.pending.len() {
            return Err(UpdateRowsError::AdapterProtocol {
                role_path: self.operation.role_path().to_string(),
                owner_key: self.owner_key.clone(),
                submitted: self.pending.len(),
                reported: counts.len(),
            });
        }

        let strict = self.context.config.row_count_policy() == RowCountPolicy::Strict;
        for (offset, &count) in counts.iter().enumerate() {
            if strict && count != 1 {
                return Err(UpdateRowsError::RowCountMismatch {
                    role_path: self.operation.role_path().to_string(),
                    owner_key: self.owner_key.clone(),
                    operation: self.submitted + offset,
                    expected: 1,
                    actual: count,
                });
            }
            self.rows += count;
        }

        self.submitted += self.pending.len();
        self.pending.clear();
        Ok(())
    }
}
