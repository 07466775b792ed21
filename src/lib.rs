#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;

pub mod collection;
pub mod coordinator;
pub mod diagnostics;
pub mod diff;
pub mod errors;
pub mod executor;
pub mod key;
pub mod mapping;
pub mod operation;
pub mod target;
pub mod value;

// Re-export main types
pub use collection::{PersistentCollection, PersistentList, PersistentMap};
pub use coordinator::{
    CompositeUpdateRows, JoinTableUpdateRows, NoOpUpdateRows, RowCountPolicy, Session,
    UpdateContext, UpdateRows, UpdateRowsConfig, UpdateRowsCoordinator,
};
pub use diagnostics::{DiagnosticsSink, RecordedEvent, RecordingSink, TracingSink, UpdateRowsEvent};
pub use diff::{ChangedEntry, diff};
pub use executor::BatchExecutor;
#[cfg(feature = "rusqlite")]
pub use executor::SqliteExecutor;
pub use key::OwnerKey;
pub use operation::{BoundOperation, OperationCache, RowMutationOperation};
pub use target::{
    MutationTarget, MutationTargetBuilder, MutationTargetProvider, TargetRegistry, ValueColumn,
};
pub use value::Value;

// Re-export errors
pub use errors::{BatchError, ConfigurationError, UpdateRowsError};
