//! storegraph core - domain types for the e-commerce read layer.
//!
//! This crate provides the records and identifiers shared by the query engine
//! and the command-line adapter:
//! - typed IDs that cannot be mixed across tables
//! - status enums with their stored integer codes
//! - the five entity records (user, address, product, order, order item)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. Storage
//! backends live in `storegraph-query` and convert their rows into these
//! records.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and status enums
//! - [`entities`] - Entity records as read from storage

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod types;

pub use entities::*;
pub use types::*;
