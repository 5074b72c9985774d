//! Report commands.
//!
//! Each command runs one fixed traversal (and optionally an aggregate) and
//! returns a serializable result. Commands are generic over the storage
//! backend so they can be exercised against in-memory tables.

pub mod graph;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;
