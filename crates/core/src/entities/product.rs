//! Catalog product records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProductId, ProductStatus};

/// A catalog entry.
///
/// `price` is the current list price. Order items keep their own snapshot of
/// the price paid, so editing a product never changes past orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Human-facing product number, unique.
    pub product_no: String,
    /// Product name.
    pub name: String,
    /// Long description.
    pub description: Option<String>,
    /// Category reference (categories are not modelled here).
    pub category_id: Option<i32>,
    /// Current list price.
    pub price: Decimal,
    /// Units in stock.
    pub stock: i32,
    /// Units sold, as maintained by the write path.
    pub sales: i32,
    /// Main image URL.
    pub image: Option<String>,
    /// Whether the product is listed.
    pub status: ProductStatus,
    /// Display ordering weight.
    pub sort: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
