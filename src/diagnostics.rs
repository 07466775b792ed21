//! Structured diagnostics emitted around every `update_rows` call.
//!
//! Each call emits exactly one [`UpdateRowsEvent::Starting`] before any row is
//! touched and, only if the call succeeds, one [`UpdateRowsEvent::Completed`]
//! carrying the row count reported by the executor. Where the events go is the
//! session's choice: [`TracingSink`] forwards them to `tracing`,
//! [`RecordingSink`] keeps them for inspection.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use tracing::Level;

use crate::OwnerKey;

/// Target used for every event forwarded to `tracing`.
pub const TRACING_TARGET: &str = "collection_mutation::update_rows";

/// An event of the update-rows lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRowsEvent<'a> {
    /// Emitted before the strategy runs.
    Starting {
        /// Role path of the collection.
        role_path: &'a str,
        /// Owner of the collection.
        owner_key: &'a OwnerKey,
    },
    /// Emitted after the strategy succeeded.
    Completed {
        /// Role path of the collection.
        role_path: &'a str,
        /// Owner of the collection.
        owner_key: &'a OwnerKey,
        /// Rows the executor reported as updated.
        row_count: u64,
    },
}

impl UpdateRowsEvent<'_> {
    /// Level the event is logged at: `TRACE` when starting, `DEBUG` when completed.
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::Starting { .. } => Level::TRACE,
            Self::Completed { .. } => Level::DEBUG,
        }
    }
}

/// Receives update-rows events.
pub trait DiagnosticsSink {
    /// Records one event.
    fn record(&mut self, event: &UpdateRowsEvent<'_>);
}

/// Forwards events to `tracing` under [`TRACING_TARGET`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, event: &UpdateRowsEvent<'_>) {
        match *event {
            UpdateRowsEvent::Starting {
                role_path,
                owner_key,
            } => {
                tracing::trace!(
                    target: TRACING_TARGET,
                    role = role_path,
                    key = %owner_key,
                    "Updating collection rows"
                );
            }
            UpdateRowsEvent::Completed {
                role_path,
                owner_key,
                row_count,
            } => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    role = role_path,
                    key = %owner_key,
                    rows = row_count,
                    "Updated collection rows"
                );
            }
        }
    }
}

/// An owned copy of an [`UpdateRowsEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    /// See [`UpdateRowsEvent::Starting`].
    Starting {
        /// Role path of the collection.
        role_path: String,
        /// Owner of the collection.
        owner_key: OwnerKey,
    },
    /// See [`UpdateRowsEvent::Completed`].
    Completed {
        /// Role path of the collection.
        role_path: String,
        /// Owner of the collection.
        owner_key: OwnerKey,
        /// Rows the executor reported as updated.
        row_count: u64,
    },
}

impl From<&UpdateRowsEvent<'_>> for RecordedEvent {
    fn from(event: &UpdateRowsEvent<'_>) -> Self {
        match *event {
            UpdateRowsEvent::Starting {
                role_path,
                owner_key,
            } => Self::Starting {
                role_path: role_path.to_string(),
                owner_key: owner_key.clone(),
            },
            UpdateRowsEvent::Completed {
                role_path,
                owner_key,
                row_count,
            } => Self::Completed {
                role_path: role_path.to_string(),
                owner_key: owner_key.clone(),
                row_count,
            },
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSink {
    events: Vec<RecordedEvent>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Drains the recorded events.
    pub fn take(&mut self) -> Vec<RecordedEvent> {
        core::mem::take(&mut self.events)
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&mut self, event: &UpdateRowsEvent<'_>) {
        self.events.push(event.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let key = OwnerKey::from(1i64);
        let starting = UpdateRowsEvent::Starting {
            role_path: "r",
            owner_key: &key,
        };
        let completed = UpdateRowsEvent::Completed {
            role_path: "r",
            owner_key: &key,
            row_count: 2,
        };
        assert_eq!(starting.level(), Level::TRACE);
        assert_eq!(completed.level(), Level::DEBUG);
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let key = OwnerKey::from(1i64);
        let mut sink = RecordingSink::new();
        sink.record(&UpdateRowsEvent::Starting {
            role_path: "r",
            owner_key: &key,
        });
        sink.record(&UpdateRowsEvent::Completed {
            role_path: "r",
            owner_key: &key,
            row_count: 3,
        });
        assert_eq!(
            sink.take(),
            [
                RecordedEvent::Starting {
                    role_path: "r".into(),
                    owner_key: key.clone(),
                },
                RecordedEvent::Completed {
                    role_path: "r".into(),
                    owner_key: key,
                    row_count: 3,
                },
            ]
        );
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        let key = OwnerKey::from("k");
        TracingSink.record(&UpdateRowsEvent::Completed {
            role_path: "r",
            owner_key: &key,
            row_count: 0,
        });
    }
}
