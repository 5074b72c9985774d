//! Order records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AddressId, OrderId, OrderStatus, UserId};

/// A placed order.
///
/// The three amounts are authoritative as stored. Nothing in this workspace
/// recomputes them from the order's items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-facing order number, unique.
    pub order_no: String,
    /// Ordering user.
    pub user_id: UserId,
    /// Shipping address.
    pub address_id: AddressId,
    /// Order total before discount.
    pub total_amount: Decimal,
    /// Discount applied.
    pub discount_amount: Decimal,
    /// Amount actually paid.
    pub pay_amount: Decimal,
    /// Current status.
    pub status: OrderStatus,
    /// Payment channel, if paid.
    pub pay_method: Option<String>,
    pub pay_time: Option<DateTime<Utc>>,
    pub ship_time: Option<DateTime<Utc>>,
    pub complete_time: Option<DateTime<Utc>>,
    /// Free-form buyer note.
    pub remark: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}
