//! Order reports.
//!
//! # Usage
//!
//! ```bash
//! sg-cli orders
//! sg-cli order 1
//! sg-cli order-products 1
//! ```

use serde::Serialize;
use storegraph_core::OrderId;
use storegraph_query::{
    Graph, GraphError, GraphLoader, OrderNode, OrderTotals, StorageAccessor, Traversal,
    order_totals, presets,
};

/// An order with its stored and summed amounts.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: OrderNode,
    pub totals: OrderTotals,
}

/// Every live order with its buyer and items.
///
/// # Errors
///
/// Returns `GraphError::StorageUnavailable` if storage fails.
pub async fn list<S: StorageAccessor>(loader: &GraphLoader<'_, S>) -> Result<Vec<Graph>, GraphError> {
    loader
        .load_all(&Traversal::from(presets::orders_overview()))
        .await
}

/// An order with buyer, address, items and products.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown order.
pub async fn detail<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: OrderId,
) -> Result<OrderDetail, GraphError> {
    let order = loader.load_order(id, &presets::order_detail()).await?;
    let totals = order_totals(&order)?;
    Ok(OrderDetail { order, totals })
}

/// An order with its items, their products, and the buyer.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown order.
pub async fn products<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: OrderId,
) -> Result<OrderNode, GraphError> {
    loader.load_order(id, &presets::order_products()).await
}
