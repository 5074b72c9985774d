//! Product reports.
//!
//! # Usage
//!
//! ```bash
//! sg-cli products
//! sg-cli product 1
//! sg-cli product-orders 1
//! sg-cli product-stats 1
//! ```

use serde::Serialize;
use storegraph_core::ProductId;
use storegraph_query::{
    Graph, GraphError, GraphLoader, ProductNode, SalesStats, StorageAccessor, Table, Traversal,
    aggregate_product_sales, presets,
};

/// Sales figures next to the product they describe.
#[derive(Debug, Serialize)]
pub struct ProductStats {
    pub product: ProductNode,
    #[serde(flatten)]
    pub stats: SalesStats,
}

/// Every live product.
///
/// # Errors
///
/// Returns `GraphError::StorageUnavailable` if storage fails.
pub async fn list<S: StorageAccessor>(loader: &GraphLoader<'_, S>) -> Result<Vec<Graph>, GraphError> {
    loader.load_all(&Traversal::bare(Table::Product)).await
}

/// One product, without associations.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown product.
pub async fn show<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: ProductId,
) -> Result<ProductNode, GraphError> {
    loader.load_product(id, &[]).await
}

/// A product with the order items, orders and buyers that bought it.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown product.
pub async fn orders<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: ProductId,
) -> Result<ProductNode, GraphError> {
    loader.load_product(id, &presets::product_orders()).await
}

/// Sales statistics for a product.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown product.
pub async fn stats<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: ProductId,
) -> Result<ProductStats, GraphError> {
    let product = loader.load_product(id, &presets::product_sales()).await?;
    let stats = aggregate_product_sales(&product)?;
    Ok(ProductStats { product, stats })
}
