//! storegraph query - eager graph loading and aggregation.
//!
//! Given a root row and a traversal (a tree of relation hops), the
//! [`GraphLoader`] assembles a nested object graph with one batched storage
//! lookup per hop. The [`aggregate`] functions then fold loaded graphs into
//! sales figures and purchase summaries.
//!
//! # Example
//!
//! ```rust
//! # async fn demo() -> Result<(), storegraph_query::GraphError> {
//! use storegraph_query::{GraphLoader, MemoryStorage, aggregate_product_sales, presets};
//! use storegraph_core::ProductId;
//!
//! let storage = MemoryStorage::new();
//! let loader = GraphLoader::new(&storage);
//!
//! let product = loader
//!     .load_product(ProductId::new(1), &presets::product_sales())
//!     .await?;
//! let stats = aggregate_product_sales(&product)?;
//! # let _ = stats;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`storage`] - Storage accessor trait, in-memory and `PostgreSQL` backends
//! - [`traversal`] - Typed hop trees and dotted-path parsing
//! - [`graph`] - Loaded node types
//! - [`loader`] - The graph loader
//! - [`aggregate`] - Statistics over loaded graphs
//! - [`error`] - Error taxonomy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod error;
pub mod graph;
pub mod loader;
pub mod storage;
pub mod traversal;

pub use aggregate::{
    Distinct, OrderTotals, ProductOccurrences, SalesStats, UserOrderSummary,
    aggregate_product_sales, order_totals, summarize_repeated_products, summarize_user_orders,
};
pub use error::GraphError;
pub use graph::{AddressNode, Graph, OrderItemNode, OrderNode, ProductNode, UserNode};
pub use loader::GraphLoader;
pub use storage::{Column, Entity, MemoryStorage, Row, StorageAccessor, StorageError, Table};
pub use traversal::{AddressHop, OrderHop, OrderItemHop, ProductHop, Traversal, UserHop, presets};
