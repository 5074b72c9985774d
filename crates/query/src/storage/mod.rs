//! Storage access for the five shop tables.
//!
//! # Tables
//!
//! - `users` - shop users
//! - `addresses` - shipping addresses (`user_id`)
//! - `products` - catalog entries
//! - `orders` - orders (`user_id`, `address_id`)
//! - `order_items` - order lines (`order_id`, `product_id`)
//!
//! Every table carries a nullable `deleted_at`. Backends hide soft-deleted
//! rows from every read.
//!
//! # Backends
//!
//! - [`memory::MemoryStorage`] - in-memory tables for tests and fixtures
//! - `postgres::PgStorage` - `PostgreSQL` through a `sqlx` pool (feature `postgres`)

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storegraph_core::{Address, Order, OrderItem, Product, User};

pub use memory::MemoryStorage;
#[cfg(feature = "postgres")]
pub use postgres::{PgStorage, PoolSettings, create_pool};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from sqlx (connection, pool timeout, query failure).
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend cannot serve reads from this table right now.
    #[error("{0} table is unavailable")]
    Unavailable(Table),

    /// A stored value could not be decoded into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The backend answered with a row from the wrong table.
    #[error("expected a {expected} row, got a {found} row")]
    UnexpectedRow {
        /// Table that was queried.
        expected: Table,
        /// Table the returned row belongs to.
        found: Table,
    },
}

/// The five tables of the shop schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    User,
    Address,
    Product,
    Order,
    OrderItem,
}

impl Table {
    /// Every table, in dependency order.
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Address,
        Self::Product,
        Self::Order,
        Self::OrderItem,
    ];

    /// Physical table name.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Address => "addresses",
            Self::Product => "products",
            Self::Order => "orders",
            Self::OrderItem => "order_items",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Address => write!(f, "Address"),
            Self::Product => write!(f, "Product"),
            Self::Order => write!(f, "Order"),
            Self::OrderItem => write!(f, "OrderItem"),
        }
    }
}

impl std::str::FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('_', "");
        match normalized.as_str() {
            "user" | "users" => Ok(Self::User),
            "address" | "addresses" => Ok(Self::Address),
            "product" | "products" => Ok(Self::Product),
            "order" | "orders" => Ok(Self::Order),
            "orderitem" | "orderitems" => Ok(Self::OrderItem),
            _ => Err(format!("unknown table: {s}")),
        }
    }
}

/// Columns a lookup can filter on.
///
/// [`Column::Id`] is the primary key; the rest are foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    UserId,
    AddressId,
    OrderId,
    ProductId,
}

impl Column {
    /// Physical column name.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::AddressId => "address_id",
            Self::OrderId => "order_id",
            Self::ProductId => "product_id",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A row from any of the five tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    User(User),
    Address(Address),
    Product(Product),
    Order(Order),
    OrderItem(OrderItem),
}

impl Row {
    /// The table this row belongs to.
    #[must_use]
    pub const fn table(&self) -> Table {
        match self {
            Self::User(_) => Table::User,
            Self::Address(_) => Table::Address,
            Self::Product(_) => Table::Product,
            Self::Order(_) => Table::Order,
            Self::OrderItem(_) => Table::OrderItem,
        }
    }

    /// Value of `column` on this row, or `None` if the table has no such column.
    #[must_use]
    pub const fn column(&self, column: Column) -> Option<i32> {
        match (self, column) {
            (Self::User(u), Column::Id) => Some(u.id.as_i32()),
            (Self::Address(a), Column::Id) => Some(a.id.as_i32()),
            (Self::Address(a), Column::UserId) => Some(a.user_id.as_i32()),
            (Self::Product(p), Column::Id) => Some(p.id.as_i32()),
            (Self::Order(o), Column::Id) => Some(o.id.as_i32()),
            (Self::Order(o), Column::UserId) => Some(o.user_id.as_i32()),
            (Self::Order(o), Column::AddressId) => Some(o.address_id.as_i32()),
            (Self::OrderItem(i), Column::Id) => Some(i.id.as_i32()),
            (Self::OrderItem(i), Column::OrderId) => Some(i.order_id.as_i32()),
            (Self::OrderItem(i), Column::ProductId) => Some(i.product_id.as_i32()),
            _ => None,
        }
    }
}

/// A record type stored in one table.
pub trait Entity: Sized + Clone + Send + Sync + 'static {
    /// Table holding this record type.
    const TABLE: Table;

    /// Primary key value.
    fn key(&self) -> i32;

    /// Unwrap a row of this table, handing back any other row unchanged.
    ///
    /// # Errors
    ///
    /// Returns the row itself if it belongs to a different table.
    #[allow(clippy::result_large_err)] // the mismatched row is moved back out
    fn from_row(row: Row) -> Result<Self, Row>;
}

macro_rules! impl_entity {
    ($ty:ident) => {
        impl Entity for $ty {
            const TABLE: Table = Table::$ty;

            fn key(&self) -> i32 {
                self.id.as_i32()
            }

            #[allow(clippy::result_large_err)]
            fn from_row(row: Row) -> Result<Self, Row> {
                match row {
                    Row::$ty(record) => Ok(record),
                    other => Err(other),
                }
            }
        }

        impl From<$ty> for Row {
            fn from(record: $ty) -> Self {
                Self::$ty(record)
            }
        }
    };
}

impl_entity!(User);
impl_entity!(Address);
impl_entity!(Product);
impl_entity!(Order);
impl_entity!(OrderItem);

/// Read access to the shop tables.
///
/// Implementations must hide soft-deleted rows and must be safe to share
/// between concurrent callers. An ID that matches nothing is simply absent
/// from the result; it is never an error.
pub trait StorageAccessor: Send + Sync {
    /// Fetch one row by primary key.
    ///
    /// Returns `Ok(None)` if the row does not exist or is soft-deleted.
    fn fetch_by_id(
        &self,
        table: Table,
        id: i32,
    ) -> impl Future<Output = Result<Option<Row>, StorageError>> + Send;

    /// Fetch every row of `table` whose `column` is one of `ids`.
    ///
    /// Rows come back in primary-key order.
    fn fetch_by_parent_ids(
        &self,
        table: Table,
        column: Column,
        ids: &[i32],
    ) -> impl Future<Output = Result<Vec<Row>, StorageError>> + Send;

    /// Fetch every live row of `table` in primary-key order.
    fn fetch_all(&self, table: Table) -> impl Future<Output = Result<Vec<Row>, StorageError>> + Send;

    /// Check that the backend can serve reads at all.
    fn ping(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}
