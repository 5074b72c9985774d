//! Entity records as read from storage.
//!
//! Records carry only their own columns. Associations are assembled by the
//! graph loader in `storegraph-query`, never stored on the records themselves.
//!
//! Soft-deleted rows are filtered out by every storage backend, so records
//! have no `deleted_at` field.

pub mod address;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use address::Address;
pub use order::Order;
pub use order_item::OrderItem;
pub use product::Product;
pub use user::User;
