//! Shipping address records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AddressId, UserId};

/// A user's shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    /// Street and building.
    pub detail: String,
    pub postal_code: Option<String>,
    /// Whether this is the user's default address.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
