//! User reports.
//!
//! # Usage
//!
//! ```bash
//! sg-cli users
//! sg-cli user-orders 1
//! sg-cli user-products 1
//! sg-cli repeated-products 1
//! sg-cli user-summary 1
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use storegraph_core::UserId;
use storegraph_query::{
    Graph, GraphError, GraphLoader, ProductOccurrences, StorageAccessor, Table, Traversal,
    UserNode, UserOrderSummary, presets, summarize_repeated_products, summarize_user_orders,
};

/// Repeated-purchase report for one user.
#[derive(Debug, Serialize)]
pub struct RepeatedProducts {
    pub user_id: UserId,
    pub username: String,
    pub products: BTreeMap<String, ProductOccurrences>,
}

/// Order overview for one user.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
    #[serde(flatten)]
    pub summary: UserOrderSummary,
}

/// Every live user, without associations.
///
/// # Errors
///
/// Returns `GraphError::StorageUnavailable` if storage fails.
pub async fn list<S: StorageAccessor>(loader: &GraphLoader<'_, S>) -> Result<Vec<Graph>, GraphError> {
    loader.load_all(&Traversal::bare(Table::User)).await
}

/// A user with addresses, orders and order items.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown user.
pub async fn orders<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: UserId,
) -> Result<UserNode, GraphError> {
    loader.load_user(id, &presets::user_orders()).await
}

/// A user with orders, items and the products behind them.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown user.
pub async fn products<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: UserId,
) -> Result<UserNode, GraphError> {
    loader.load_user(id, &presets::user_orders_with_products()).await
}

/// Products the user bought, with the orders each appeared in.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown user.
pub async fn repeated_products<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: UserId,
) -> Result<RepeatedProducts, GraphError> {
    let user = loader.load_user(id, &presets::user_orders()).await?;
    let products = summarize_repeated_products(&user)?;
    Ok(RepeatedProducts {
        user_id: user.user.id,
        username: user.user.username,
        products,
    })
}

/// Order counts per status and amounts paid.
///
/// # Errors
///
/// Returns `GraphError::NotFound` for an unknown user.
pub async fn summary<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    id: UserId,
) -> Result<UserSummary, GraphError> {
    let user = loader.load_user(id, &presets::user_orders()).await?;
    let summary = summarize_user_orders(&user)?;
    Ok(UserSummary {
        user_id: user.user.id,
        username: user.user.username,
        summary,
    })
}
