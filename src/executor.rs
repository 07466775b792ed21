//! The batched execution boundary.
//!
//! The engine that owns the connection implements [`BatchExecutor`]; the
//! coordinators only hand it bound operations and read back row counts.

use alloc::vec::Vec;

use crate::{BoundOperation, errors::BatchError};

#[cfg(feature = "rusqlite")]
mod sqlite;

#[cfg(feature = "rusqlite")]
pub use sqlite::SqliteExecutor;

/// Executes bound operations in submission order.
pub trait BatchExecutor {
    /// Executes `batch` and returns the affected-row count of each operation,
    /// in the same order.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] naming the position, within `batch`, of the
    /// operation that failed. Operations after it must not be executed.
    fn execute_batch(&mut self, batch: &[BoundOperation]) -> Result<Vec<u64>, BatchError>;
}

impl<X: BatchExecutor + ?Sized> BatchExecutor for &mut X {
    #[inline]
    fn execute_batch(&mut self, batch: &[BoundOperation]) -> Result<Vec<u64>, BatchError> {
        X::execute_batch(self, batch)
    }
}
