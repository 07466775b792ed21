//! Submodule defining the errors used across the crate.

use alloc::boxed::Box;
use alloc::string::String;

use crate::OwnerKey;

/// Errors raised while assembling a mutation target or building its operation.
///
/// These describe a malformed mapping and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The target declares no owning-key column.
    #[error("Collection `{role_path}` declares no owning-key column")]
    NoKeyColumns {
        /// Role path of the offending target.
        role_path: String,
    },
    /// The target declares no index column, so rows cannot be addressed.
    #[error("Collection `{role_path}` declares no index column")]
    NoIndexColumns {
        /// Role path of the offending target.
        role_path: String,
    },
    /// The target has no value column that may be written by an UPDATE.
    #[error("Collection `{role_path}` has no updatable value column")]
    NoUpdatableColumns {
        /// Role path of the offending target.
        role_path: String,
    },
    /// The target is the inverse side of an association; its rows are never
    /// updated from this side.
    #[error("Collection `{role_path}` is inverse and has no row update operation")]
    InverseTarget {
        /// Role path of the offending target.
        role_path: String,
    },
    /// The same physical column is mapped twice.
    #[error("Collection `{role_path}` maps column `{column}` more than once")]
    DuplicateColumn {
        /// Role path of the offending target.
        role_path: String,
        /// The duplicated column name.
        column: String,
    },
    /// A strategy's mapping does not span the columns declared on the target.
    #[error(
        "Collection `{role_path}` maps {actual} {kind} column(s) but the target declares {expected}"
    )]
    MappingSpan {
        /// Role path of the offending target.
        role_path: String,
        /// Which column group disagrees (`index` or `value`).
        kind: &'static str,
        /// Columns declared on the target.
        expected: usize,
        /// Columns produced by the mapping.
        actual: usize,
    },
}

/// Error reported by a [`crate::BatchExecutor`] for one submitted batch.
#[derive(Debug, thiserror::Error)]
#[error("Bound operation {index} of the batch failed: {source}")]
pub struct BatchError {
    /// Position of the failing bound operation within the submitted slice.
    pub index: usize,
    /// The underlying transport failure.
    #[source]
    pub source: Box<dyn core::error::Error + Send + Sync>,
}

impl BatchError {
    /// Wraps a transport error for the bound operation at `index`.
    #[must_use]
    pub fn new(index: usize, source: impl core::error::Error + Send + Sync + 'static) -> Self {
        Self {
            index,
            source: Box::new(source),
        }
    }
}

/// Errors that abort a single `update_rows` call.
///
/// Every variant carries the role path and the owner key of the failed call,
/// so one error describes the whole unit of work rather than a single row.
#[derive(Debug, thiserror::Error)]
pub enum UpdateRowsError {
    /// The owner key does not match the target's owning-key columns.
    #[error("Owner key for `{role_path}` has {actual} value(s), expected {expected}")]
    OwnerKeyArity {
        /// Role path of the collection.
        role_path: String,
        /// Number of owning-key columns.
        expected: usize,
        /// Number of values in the supplied key.
        actual: usize,
    },
    /// A value of the owner key is NULL, so it cannot address any row.
    #[error("Owner key for `{role_path}` has a NULL value in column {column}")]
    NullOwnerKey {
        /// Role path of the collection.
        role_path: String,
        /// Position of the NULL value among the owning-key columns.
        column: usize,
    },
    /// An index or element decomposed into the wrong number of column values.
    #[error(
        "Binding for `{role_path}#{owner_key}` produced {actual} parameter(s), expected {expected}"
    )]
    Binding {
        /// Role path of the collection.
        role_path: String,
        /// Owner of the collection.
        owner_key: OwnerKey,
        /// Parameters required by the operation.
        expected: usize,
        /// Parameters produced by the mappings.
        actual: usize,
    },
    /// The executor failed while running a bound operation.
    #[error("Updating `{role_path}#{owner_key}` failed at bound operation {operation}")]
    Execution {
        /// Role path of the collection.
        role_path: String,
        /// Owner of the collection.
        owner_key: OwnerKey,
        /// Position of the failing operation among all operations of the call.
        operation: usize,
        /// The executor's error.
        #[source]
        source: Box<dyn core::error::Error + Send + Sync>,
    },
    /// A bound operation touched a number of rows other than the single row it addressed.
    #[error(
        "Expected row not found updating `{role_path}#{owner_key}`: bound operation {operation} affected {actual} row(s), expected {expected}"
    )]
    RowCountMismatch {
        /// Role path of the collection.
        role_path: String,
        /// Owner of the collection.
        owner_key: OwnerKey,
        /// Position of the operation among all operations of the call.
        operation: usize,
        /// Rows the operation had to affect.
        expected: u64,
        /// Rows the executor reported.
        actual: u64,
    },
    /// The executor returned a row-count list that does not match the batch.
    #[error(
        "Executor returned {reported} row count(s) for {submitted} bound operation(s) updating `{role_path}#{owner_key}`"
    )]
    AdapterProtocol {
        /// Role path of the collection.
        role_path: String,
        /// Owner of the collection.
        owner_key: OwnerKey,
        /// Operations submitted in the batch.
        submitted: usize,
        /// Counts returned by the executor.
        reported: usize,
    },
}

impl UpdateRowsError {
    /// Role path of the collection the failed call was updating.
    #[must_use]
    pub fn role_path(&self) -> &str {
        match self {
            Self::OwnerKeyArity { role_path, .. }
            | Self::NullOwnerKey { role_path, .. }
            | Self::Binding { role_path, .. }
            | Self::Execution { role_path, .. }
            | Self::RowCountMismatch { role_path, .. }
            | Self::AdapterProtocol { role_path, .. } => role_path,
        }
    }

    /// Position of the bound operation that failed, when the failure is tied to one.
    #[must_use]
    pub fn operation(&self) -> Option<usize> {
        match self {
            Self::Execution { operation, .. } | Self::RowCountMismatch { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }
}
