//! Order line item records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderItemId, ProductId};

/// One line of an order.
///
/// `product_name`, `product_image` and `price` are a snapshot taken when the
/// order was placed. They are independent copies of the product's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique line item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Purchased product.
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    /// Product image at purchase time.
    pub product_image: Option<String>,
    /// Unit price at purchase time.
    pub price: Decimal,
    /// Units purchased.
    pub quantity: i32,
    /// Line subtotal as charged.
    pub subtotal: Decimal,
    /// When the line was created.
    pub created_at: DateTime<Utc>,
    /// When the line was last updated.
    pub updated_at: DateTime<Utc>,
}
