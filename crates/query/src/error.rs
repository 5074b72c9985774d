//! Errors returned by graph loading and aggregation.

use thiserror::Error;

use crate::storage::{StorageError, Table};

/// Errors surfaced to callers of the loader and the aggregates.
///
/// None of these are retried internally. A load that fails never hands back a
/// partially populated graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The root row does not exist or is soft-deleted.
    #[error("{table} {id} not found")]
    NotFound {
        /// Root table.
        table: Table,
        /// Requested root ID.
        id: i32,
    },

    /// A dynamic traversal path names a relation its table does not define.
    #[error("invalid traversal: {table} has no relation `{relation}`")]
    InvalidTraversal {
        /// Table the unknown relation was looked up on.
        table: Table,
        /// The offending path segment.
        relation: String,
    },

    /// Storage failed somewhere during the load.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// An aggregate was handed a graph without an association it needs.
    #[error("{table} graph was loaded without its `{relation}` association")]
    NotLoaded {
        /// Table of the node missing the association.
        table: Table,
        /// Relation name that should have been loaded.
        relation: &'static str,
    },
}

impl GraphError {
    /// Whether the error is the caller asking for something that isn't there.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
