//! Row mutation operations: the reusable UPDATE template of a collection table.
//!
//! [`RowMutationOperation::build`] derives the statement shape from a
//! [`MutationTarget`] once; every changed entry is then expressed as a
//! [`BoundOperation`], the shared template plus that row's parameters.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::{self, Display};

use hashbrown::HashMap;

use crate::{MutationTarget, Value, errors::ConfigurationError};

mod sql;

/// Parameterized UPDATE of one row of a collection table.
///
/// Parameters are positional: first the SET columns, then the owning-key
/// columns, then the index columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowMutationOperation {
    role_path: String,
    table: String,
    set_columns: Vec<String>,
    key_columns: Vec<String>,
    index_columns: Vec<String>,
    value_mask: Vec<bool>,
    sql: String,
}

impl RowMutationOperation {
    /// Derives the UPDATE shape of `target`.
    ///
    /// Pure and deterministic: the same target always yields an equal operation.
    ///
    /// # Errors
    ///
    /// * `InverseTarget` - If the target is inverse; serve it with
    ///   [`crate::UpdateRowsCoordinator::no_op`].
    /// * `NoUpdatableColumns` - If the target has no updatable value column.
    pub fn build(target: &MutationTarget) -> Result<Self, ConfigurationError> {
        if target.is_inverse() {
            return Err(ConfigurationError::InverseTarget {
                role_path: target.role_path().to_string(),
            });
        }
        let set_columns: Vec<String> = target
            .updatable_columns()
            .map(|column| column.name().to_string())
            .collect();
        if set_columns.is_empty() {
            return Err(ConfigurationError::NoUpdatableColumns {
                role_path: target.role_path().to_string(),
            });
        }

        let mut operation = Self {
            role_path: target.role_path().to_string(),
            table: target.table().to_string(),
            set_columns,
            key_columns: target.key_columns().to_vec(),
            index_columns: target.index_columns().to_vec(),
            value_mask: target
                .value_columns()
                .iter()
                .map(crate::ValueColumn::is_updatable)
                .collect(),
            sql: String::new(),
        };
        operation.sql = Template(&operation).to_string();
        Ok(operation)
    }

    fn write_sql<W: fmt::Write>(
        &self,
        out: &mut W,
        param: impl FnMut(&mut W, usize) -> fmt::Result,
    ) -> fmt::Result {
        sql::write_update(
            out,
            &self.table,
            self.set_columns.iter().map(String::as_str),
            self.restriction_columns(),
            param,
        )
    }

    /// Role path of the collection this operation updates.
    #[must_use]
    pub fn role_path(&self) -> &str {
        &self.role_path
    }

    /// The collection table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns written by the operation.
    #[must_use]
    pub fn set_columns(&self) -> &[String] {
        &self.set_columns
    }

    /// Owning-key columns of the WHERE predicate.
    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Index columns of the WHERE predicate.
    #[must_use]
    pub fn index_columns(&self) -> &[String] {
        &self.index_columns
    }

    /// All WHERE predicate columns: owning key first, then index.
    pub fn restriction_columns(&self) -> impl Iterator<Item = &str> {
        self.key_columns
            .iter()
            .chain(&self.index_columns)
            .map(String::as_str)
    }

    /// For every value column of the target, whether it is written.
    #[must_use]
    pub fn value_mask(&self) -> &[bool] {
        &self.value_mask
    }

    /// Number of parameters a bound operation must carry.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.set_columns.len() + self.key_columns.len() + self.index_columns.len()
    }

    /// The parameterized statement, with `?N` placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Binds `parameters` to the template.
    ///
    /// Returns `None` when the parameter count does not match
    /// [`RowMutationOperation::parameter_count`].
    #[must_use]
    pub fn bind(self: &Arc<Self>, parameters: Vec<Value>) -> Option<BoundOperation> {
        (parameters.len() == self.parameter_count()).then(|| BoundOperation {
            operation: Arc::clone(self),
            parameters,
        })
    }
}

/// An operation template together with the parameters of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundOperation {
    operation: Arc<RowMutationOperation>,
    parameters: Vec<Value>,
}

impl BoundOperation {
    /// The shared template.
    #[must_use]
    pub fn operation(&self) -> &RowMutationOperation {
        &self.operation
    }

    /// The parameterized statement to execute.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.operation.sql()
    }

    /// Parameter values, in placeholder order.
    #[must_use]
    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    /// The values written into the SET columns.
    #[must_use]
    pub fn set_values(&self) -> &[Value] {
        &self.parameters[..self.operation.set_columns.len()]
    }

    /// The values of the WHERE predicate.
    #[must_use]
    pub fn restriction_values(&self) -> &[Value] {
        &self.parameters[self.operation.set_columns.len()..]
    }
}

impl Display for BoundOperation {
    /// Formats the statement with parameters inlined as SQL literals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.operation.write_sql(f, sql::literal(&self.parameters))
    }
}

/// The statement of an operation with `?N` placeholders.
struct Template<'a>(&'a RowMutationOperation);

impl Display for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_sql(f, sql::placeholder)
    }
}

/// Memoizes built operations by role path.
///
/// The owning engine builds each operation once and hands the shared template
/// to every strategy serving that role.
#[derive(Debug, Default, Clone)]
pub struct OperationCache {
    operations: HashMap<String, Arc<RowMutationOperation>>,
}

impl OperationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached operation for `target`, building it on first use.
    ///
    /// # Errors
    ///
    /// Propagates [`RowMutationOperation::build`] failures; nothing is cached then.
    pub fn get_or_build(
        &mut self,
        target: &MutationTarget,
    ) -> Result<Arc<RowMutationOperation>, ConfigurationError> {
        if let Some(operation) = self.operations.get(target.role_path()) {
            return Ok(Arc::clone(operation));
        }
        let operation = Arc::new(RowMutationOperation::build(target)?);
        self.operations
            .insert(target.role_path().to_string(), Arc::clone(&operation));
        Ok(operation)
    }

    /// Number of cached operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
