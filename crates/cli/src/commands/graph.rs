//! Ad-hoc graph loading from dotted relation paths.
//!
//! # Usage
//!
//! ```bash
//! sg-cli graph user 1 --include Orders.OrderItems.Product --include Addresses
//! sg-cli graph order 5 -i User -i OrderItems
//! ```

use storegraph_query::{Graph, GraphError, GraphLoader, StorageAccessor, Table};

/// Load `table` row `id` with the given relation paths.
///
/// # Errors
///
/// Returns `GraphError::InvalidTraversal` for an unknown relation and
/// `GraphError::NotFound` for an unknown row.
pub async fn load<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    table: Table,
    id: i32,
    include: &[String],
) -> Result<Graph, GraphError> {
    let paths: Vec<&str> = include.iter().map(String::as_str).collect();
    loader.load_graph(table, id, &paths).await
}
