//! Database health check.

use serde::Serialize;
use storegraph_query::{GraphError, GraphLoader, StorageAccessor};

/// Result of a successful check.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Run one round trip against the backend.
///
/// # Errors
///
/// Returns `GraphError::StorageUnavailable` if the backend cannot answer.
pub async fn check<S: StorageAccessor>(loader: &GraphLoader<'_, S>) -> Result<Health, GraphError> {
    loader.storage().ping().await?;
    Ok(Health { status: "ok" })
}
