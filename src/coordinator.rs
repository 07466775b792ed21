//! The update-rows coordinator and its storage strategies.
//!
//! [`UpdateRowsCoordinator`] is the entry point the flush of a unit of work
//! calls for every collection whose elements may have changed in place. It
//! brackets the strategy with diagnostics and leaves the actual work (diff,
//! bind, execute) to an [`UpdateRows`] strategy:
//!
//! - [`JoinTableUpdateRows`] for element collections and join tables whose
//!   element maps through an [`crate::mapping::ElementMapping`],
//! - [`CompositeUpdateRows`] for embeddable elements flattened into several
//!   columns, some of which may be read-only,
//! - [`NoOpUpdateRows`] for inverse or immutable collections.

use core::fmt::{self, Display};
use core::hash::Hash;
use core::num::NonZeroUsize;

use alloc::string::ToString;
use alloc::sync::Arc;

use crate::{
    BatchExecutor, MutationTarget, OwnerKey, PersistentCollection, Value,
    diagnostics::{DiagnosticsSink, TracingSink, UpdateRowsEvent},
    errors::UpdateRowsError,
};

mod batch;
mod composite;
mod join_table;
mod no_op;

pub use composite::CompositeUpdateRows;
pub use join_table::JoinTableUpdateRows;
pub use no_op::NoOpUpdateRows;

/// How affected-row counts reported by the executor are checked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowCountPolicy {
    /// Every bound operation must update exactly one row; anything else fails
    /// the call with [`UpdateRowsError::RowCountMismatch`].
    #[default]
    Strict,
    /// Counts are only summed and reported, never checked.
    Aggregate,
}

/// Tuning of the update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateRowsConfig {
    batch_size: NonZeroUsize,
    row_count_policy: RowCountPolicy,
}

impl UpdateRowsConfig {
    /// Bound operations submitted per executor call unless configured otherwise.
    pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(32).unwrap();

    /// Sets how many bound operations are submitted per executor call.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the row-count verification policy.
    #[must_use]
    pub const fn with_row_count_policy(mut self, policy: RowCountPolicy) -> Self {
        self.row_count_policy = policy;
        self
    }

    /// Bound operations submitted per executor call.
    #[must_use]
    pub const fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// The row-count verification policy.
    #[must_use]
    pub const fn row_count_policy(&self) -> RowCountPolicy {
        self.row_count_policy
    }
}

impl Default for UpdateRowsConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            row_count_policy: RowCountPolicy::default(),
        }
    }
}

/// The unit-of-work context an `update_rows` call runs in.
///
/// Borrowing the executor mutably for the whole call keeps a session from
/// running two calls at once.
pub struct Session<'s> {
    executor: &'s mut dyn BatchExecutor,
    diagnostics: Option<&'s mut dyn DiagnosticsSink>,
}

impl<'s> Session<'s> {
    /// A session whose events go to `tracing`.
    #[must_use]
    pub fn new(executor: &'s mut dyn BatchExecutor) -> Self {
        Self {
            executor,
            diagnostics: None,
        }
    }

    /// A session whose events go to `diagnostics` instead of `tracing`.
    #[must_use]
    pub fn with_diagnostics(
        executor: &'s mut dyn BatchExecutor,
        diagnostics: &'s mut dyn DiagnosticsSink,
    ) -> Self {
        Self {
            executor,
            diagnostics: Some(diagnostics),
        }
    }

    fn emit(&mut self, event: &UpdateRowsEvent<'_>) {
        match self.diagnostics.as_deref_mut() {
            Some(sink) => sink.record(event),
            None => TracingSink.record(event),
        }
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("diagnostics", &self.diagnostics.is_some())
            .finish_non_exhaustive()
    }
}

/// What a strategy gets to work with during one call.
pub struct UpdateContext<'c> {
    config: &'c UpdateRowsConfig,
    executor: &'c mut dyn BatchExecutor,
}

impl<'c> UpdateContext<'c> {
    /// A context running with `config` against `executor`.
    #[must_use]
    pub fn new(config: &'c UpdateRowsConfig, executor: &'c mut dyn BatchExecutor) -> Self {
        Self { config, executor }
    }

    /// The coordinator's configuration.
    #[must_use]
    pub fn config(&self) -> &UpdateRowsConfig {
        self.config
    }
}

impl fmt::Debug for UpdateContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateContext")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// A storage strategy for updating the rows of changed collection entries.
pub trait UpdateRows<K: Hash + Eq, E> {
    /// Updates the rows of every entry that changed in place and returns the
    /// number of rows the executor reported as updated.
    ///
    /// # Errors
    ///
    /// Returns the first binding, execution or row-count failure; no further
    /// operation is submitted after it.
    fn do_update(
        &self,
        key: &OwnerKey,
        collection: &PersistentCollection<K, E>,
        context: &mut UpdateContext<'_>,
    ) -> Result<u64, UpdateRowsError>;
}

/// Updates the rows of one collection role.
///
/// Immutable once built and shareable across sessions.
#[derive(Debug, Clone)]
pub struct UpdateRowsCoordinator<S> {
    target: Arc<MutationTarget>,
    strategy: S,
    config: UpdateRowsConfig,
}

impl<S> UpdateRowsCoordinator<S> {
    /// A coordinator for `target` delegating to `strategy`, with default configuration.
    #[must_use]
    pub fn new(target: Arc<MutationTarget>, strategy: S) -> Self {
        Self {
            target,
            strategy,
            config: UpdateRowsConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: UpdateRowsConfig) -> Self {
        self.config = config;
        self
    }

    /// The collection this coordinator updates.
    #[must_use]
    pub fn mutation_target(&self) -> &MutationTarget {
        &self.target
    }

    /// The strategy doing the work.
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &UpdateRowsConfig {
        &self.config
    }

    /// Updates the rows of every entry of `collection` that changed in place.
    ///
    /// Neither the snapshot nor the state of `collection` is modified;
    /// re-baselining after success is up to the caller.
    ///
    /// # Errors
    ///
    /// See [`UpdateRowsCoordinator::update_rows_counted`].
    pub fn update_rows<K, E>(
        &self,
        key: &OwnerKey,
        collection: &PersistentCollection<K, E>,
        session: &mut Session<'_>,
    ) -> Result<(), UpdateRowsError>
    where
        K: Hash + Eq,
        S: UpdateRows<K, E>,
    {
        self.update_rows_counted(key, collection, session).map(|_| ())
    }

    /// Like [`UpdateRowsCoordinator::update_rows`], also returning the updated row count.
    ///
    /// # Errors
    ///
    /// * `OwnerKeyArity` - If `key` does not cover the target's owning-key columns.
    /// * `NullOwnerKey` - If a value of `key` is NULL.
    /// * Any error of the strategy, unchanged. No completion event is emitted then.
    pub fn update_rows_counted<K, E>(
        &self,
        key: &OwnerKey,
        collection: &PersistentCollection<K, E>,
        session: &mut Session<'_>,
    ) -> Result<u64, UpdateRowsError>
    where
        K: Hash + Eq,
        S: UpdateRows<K, E>,
    {
        let role_path = self.target.role_path();
        let expected = self.target.key_columns().len();
        if key.len() != expected {
            return Err(UpdateRowsError::OwnerKeyArity {
                role_path: role_path.to_string(),
                expected,
                actual: key.len(),
            });
        }
        if let Some(column) = key.values().iter().position(Value::is_null) {
            return Err(UpdateRowsError::NullOwnerKey {
                role_path: role_path.to_string(),
                column,
            });
        }

        session.emit(&UpdateRowsEvent::Starting {
            role_path,
            owner_key: key,
        });

        let mut context = UpdateContext::new(&self.config, &mut *session.executor);
        let row_count = self.strategy.do_update(key, collection, &mut context)?;

        session.emit(&UpdateRowsEvent::Completed {
            role_path,
            owner_key: key,
            row_count,
        });
        Ok(row_count)
    }
}

impl UpdateRowsCoordinator<NoOpUpdateRows> {
    /// A coordinator for a collection whose rows are never updated in place,
    /// such as the inverse side of an association.
    #[must_use]
    pub fn no_op(target: Arc<MutationTarget>) -> Self {
        Self::new(target, NoOpUpdateRows)
    }
}

impl<S> Display for UpdateRowsCoordinator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdateRowsCoordinator({})", self.target.role_path())
    }
}
