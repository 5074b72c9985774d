//! Status enums for users, products and orders.
//!
//! Statuses are stored as small integers. Each enum converts from its stored
//! code with [`TryFrom<i16>`] and back with `code()`.

use serde::{Deserialize, Serialize};

/// A stored status code that does not map to any known variant.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid {kind} status code: {code}")]
pub struct StatusCodeError {
    /// Which status enum was being decoded.
    pub kind: &'static str,
    /// The offending stored value.
    pub code: i16,
}

/// Order status.
///
/// No transition order is enforced here; status is set by the write path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// The integer code stored in the `orders.status` column.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Paid => 1,
            Self::Shipped => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = StatusCodeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Paid),
            2 => Ok(Self::Shipped),
            3 => Ok(Self::Completed),
            4 => Ok(Self::Cancelled),
            _ => Err(StatusCodeError {
                kind: "order",
                code,
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Shipped => write!(f, "shipped"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Banned,
    #[default]
    Normal,
}

impl UserStatus {
    /// The integer code stored in the `users.status` column.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Banned => 0,
            Self::Normal => 1,
        }
    }
}

impl TryFrom<i16> for UserStatus {
    type Error = StatusCodeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Banned),
            1 => Ok(Self::Normal),
            _ => Err(StatusCodeError { kind: "user", code }),
        }
    }
}

/// Product listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    OffSale,
    #[default]
    OnSale,
}

impl ProductStatus {
    /// The integer code stored in the `products.status` column.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::OffSale => 0,
            Self::OnSale => 1,
        }
    }
}

impl TryFrom<i16> for ProductStatus {
    type Error = StatusCodeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::OffSale),
            1 => Ok(Self::OnSale),
            _ => Err(StatusCodeError {
                kind: "product",
                code,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_codes_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::try_from(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_rejects_unknown_code() {
        let err = OrderStatus::try_from(9).unwrap_err();
        assert_eq!(err.kind, "order");
        assert_eq!(err.code, 9);
        assert_eq!(err.to_string(), "invalid order status code: 9");
    }

    #[test]
    fn test_user_and_product_status_codes() {
        assert_eq!(UserStatus::try_from(1).unwrap(), UserStatus::Normal);
        assert_eq!(UserStatus::Banned.code(), 0);
        assert_eq!(ProductStatus::try_from(0).unwrap(), ProductStatus::OffSale);
        assert!(ProductStatus::try_from(-1).is_err());
    }

    #[test]
    fn test_order_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
