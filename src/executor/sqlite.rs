//! [`BatchExecutor`] over a rusqlite connection.

use alloc::vec::Vec;

use rusqlite::{Connection, params_from_iter, types::ToSqlOutput, types::Value as SqlValue};

use super::BatchExecutor;
use crate::{BoundOperation, Value, errors::BatchError};

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Null => SqlValue::Null,
            Value::Integer(v) => SqlValue::Integer(*v),
            Value::Real(v) => SqlValue::Real(*v),
            Value::Text(v) => return Ok(ToSqlOutput::from(v.as_str())),
            Value::Blob(v) => return Ok(ToSqlOutput::from(v.as_slice())),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// Executes bound operations one by one on a SQLite connection.
///
/// Statements are prepared through the connection's statement cache, so all
/// rows of one collection share a single prepared UPDATE.
#[derive(Debug)]
pub struct SqliteExecutor<'conn> {
    connection: &'conn Connection,
}

impl<'conn> SqliteExecutor<'conn> {
    /// Wraps `connection`; transaction control stays with the caller.
    #[must_use]
    pub fn new(connection: &'conn Connection) -> Self {
        Self { connection }
    }
}

impl BatchExecutor for SqliteExecutor<'_> {
    fn execute_batch(&mut self, batch: &[BoundOperation]) -> Result<Vec<u64>, BatchError> {
        let mut counts = Vec::with_capacity(batch.len());
        for (index, bound) in batch.iter().enumerate() {
            let affected = self
                .connection
                .prepare_cached(bound.sql())
                .and_then(|mut statement| statement.execute(params_from_iter(bound.parameters())))
                .map_err(|error| BatchError::new(index, error))?;
            counts.push(affected as u64);
        }
        Ok(counts)
    }
}
