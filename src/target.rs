//! Mutation targets: the resolved, immutable description of a collection mapping.
//!
//! A [`MutationTarget`] is created once, when mapping metadata resolves, and is
//! then shared read-only (behind an [`Arc`]) by every coordinator serving that
//! collection role, across all sessions.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::{collection::IndexMap, errors::ConfigurationError};

/// A physical value column of a collection table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueColumn {
    name: String,
    updatable: bool,
}

impl ValueColumn {
    /// An updatable value column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            updatable: true,
        }
    }

    /// A value column that is never written by an UPDATE.
    #[must_use]
    pub fn read_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            updatable: false,
        }
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether UPDATEs may write this column.
    #[must_use]
    pub fn is_updatable(&self) -> bool {
        self.updatable
    }
}

/// Resolved description of one collection mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTarget {
    role_path: String,
    table: String,
    key_columns: Vec<String>,
    index_columns: Vec<String>,
    value_columns: Vec<ValueColumn>,
    inverse: bool,
}

impl MutationTarget {
    /// Starts describing the collection `role_path` stored in `table`.
    #[must_use]
    pub fn builder(role_path: impl Into<String>, table: impl Into<String>) -> MutationTargetBuilder {
        MutationTargetBuilder {
            target: Self {
                role_path: role_path.into(),
                table: table.into(),
                key_columns: Vec::new(),
                index_columns: Vec::new(),
                value_columns: Vec::new(),
                inverse: false,
            },
        }
    }

    /// Human-readable role path, e.g. `com.acme.Order.lines`.
    #[must_use]
    pub fn role_path(&self) -> &str {
        &self.role_path
    }

    /// The collection table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns holding the owner key, in key order.
    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Columns holding the element's position or map key.
    #[must_use]
    pub fn index_columns(&self) -> &[String] {
        &self.index_columns
    }

    /// All value columns, updatable or not, in mapping order.
    #[must_use]
    pub fn value_columns(&self) -> &[ValueColumn] {
        &self.value_columns
    }

    /// Value columns an UPDATE may write, in mapping order.
    pub fn updatable_columns(&self) -> impl Iterator<Item = &ValueColumn> {
        self.value_columns.iter().filter(|column| column.updatable)
    }

    /// Whether the other side of the association owns the rows.
    #[must_use]
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }
}

impl MutationTarget {
    fn first_duplicate_column(&self) -> Option<String> {
        let mut seen = HashSet::new();
        self.key_columns
            .iter()
            .chain(&self.index_columns)
            .map(String::as_str)
            .chain(self.value_columns.iter().map(ValueColumn::name))
            .find(|name| !seen.insert(*name))
            .map(ToString::to_string)
    }
}

/// Builder for [`MutationTarget`].
#[derive(Debug, Clone)]
pub struct MutationTargetBuilder {
    target: MutationTarget,
}

impl MutationTargetBuilder {
    /// Appends an owning-key column.
    #[must_use]
    pub fn key_column(mut self, name: impl Into<String>) -> Self {
        self.target.key_columns.push(name.into());
        self
    }

    /// Appends an index (position or map-key) column.
    #[must_use]
    pub fn index_column(mut self, name: impl Into<String>) -> Self {
        self.target.index_columns.push(name.into());
        self
    }

    /// Appends a value column.
    #[must_use]
    pub fn value_column(mut self, column: ValueColumn) -> Self {
        self.target.value_columns.push(column);
        self
    }

    /// Marks the collection as inverse: its rows are maintained from the other side.
    #[must_use]
    pub fn inverse(mut self, inverse: bool) -> Self {
        self.target.inverse = inverse;
        self
    }

    /// Validates the description and freezes it.
    ///
    /// # Errors
    ///
    /// * `NoKeyColumns` - If no owning-key column was declared.
    /// * `NoIndexColumns` - If no index column was declared.
    /// * `DuplicateColumn` - If a column name appears twice across all groups.
    ///
    /// Having no updatable value column is not checked here: inverse targets
    /// are legitimately read-only. The operation builder reports both.
    pub fn build(self) -> Result<Arc<MutationTarget>, ConfigurationError> {
        let target = self.target;
        if target.key_columns.is_empty() {
            return Err(ConfigurationError::NoKeyColumns {
                role_path: target.role_path,
            });
        }
        if target.index_columns.is_empty() {
            return Err(ConfigurationError::NoIndexColumns {
                role_path: target.role_path,
            });
        }

        if let Some(column) = target.first_duplicate_column() {
            return Err(ConfigurationError::DuplicateColumn {
                role_path: target.role_path,
                column,
            });
        }

        Ok(Arc::new(target))
    }
}

/// Resolves a role path to its mutation target.
pub trait MutationTargetProvider {
    /// Returns the target registered for `role_path`, if any.
    fn resolve(&self, role_path: &str) -> Option<Arc<MutationTarget>>;
}

/// In-memory [`MutationTargetProvider`], keyed by role path in registration order.
#[derive(Debug, Default, Clone)]
pub struct TargetRegistry {
    targets: IndexMap<String, Arc<MutationTarget>>,
}

impl TargetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target` under its own role path, replacing any previous entry.
    pub fn register(&mut self, target: Arc<MutationTarget>) -> Option<Arc<MutationTarget>> {
        self.targets.insert(target.role_path.clone(), target)
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no target is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates over registered targets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MutationTarget>> {
        self.targets.values()
    }
}

impl MutationTargetProvider for TargetRegistry {
    fn resolve(&self, role_path: &str) -> Option<Arc<MutationTarget>> {
        self.targets.get(role_path).cloned()
    }
}
