//! Eager graph loading.
//!
//! The loader resolves the root row, then walks the traversal one hop at a
//! time. Each hop is answered by a single batched lookup over the distinct
//! linking IDs of every node at that level, so the number of queries depends
//! on the shape of the traversal and never on how many rows it fans out to.
//!
//! Children are expanded before they are attached. Has-many children are
//! moved into their parent; belongs-to targets are loaded once per distinct
//! ID and cloned into each parent that references them.

use std::collections::HashMap;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, instrument};

use storegraph_core::{
    Address, AddressId, Order, OrderId, OrderItem, OrderItemId, Product, ProductId, User, UserId,
};

use crate::aggregate::Distinct;
use crate::error::GraphError;
use crate::graph::{AddressNode, Graph, OrderItemNode, OrderNode, ProductNode, UserNode};
use crate::storage::{Column, Entity, Row, StorageAccessor, StorageError, Table};
use crate::traversal::{
    AddressHop, NamedHop, OrderHop, OrderItemHop, ProductHop, Traversal, UserHop,
};

/// Builds object graphs from a [`StorageAccessor`].
///
/// The loader keeps no state between calls; every load owns the graph it
/// builds and either returns all of it or nothing.
#[derive(Debug)]
pub struct GraphLoader<'a, S> {
    storage: &'a S,
}

impl<S> Clone for GraphLoader<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for GraphLoader<'_, S> {}

impl<'a, S: StorageAccessor> GraphLoader<'a, S> {
    /// Create a loader reading from `storage`.
    #[must_use]
    pub const fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// The backend this loader reads from.
    #[must_use]
    pub const fn storage(&self) -> &'a S {
        self.storage
    }

    /// Load the graph described by `traversal` for one root row.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the root row does not exist or is
    /// soft-deleted, and [`GraphError::StorageUnavailable`] if any lookup
    /// fails.
    #[instrument(skip(self, traversal), fields(table = %traversal.root()))]
    pub async fn load(&self, traversal: &Traversal, root_id: i32) -> Result<Graph, GraphError> {
        let graph = match traversal {
            Traversal::User(hops) => Graph::User(self.load_user(UserId::new(root_id), hops).await?),
            Traversal::Address(hops) => {
                Graph::Address(self.load_address(AddressId::new(root_id), hops).await?)
            }
            Traversal::Product(hops) => {
                Graph::Product(self.load_product(ProductId::new(root_id), hops).await?)
            }
            Traversal::Order(hops) => {
                Graph::Order(self.load_order(OrderId::new(root_id), hops).await?)
            }
            Traversal::OrderItem(hops) => {
                Graph::OrderItem(self.load_order_item(OrderItemId::new(root_id), hops).await?)
            }
        };
        debug!("graph loaded");
        Ok(graph)
    }

    /// Load a graph from dotted relation paths such as `"Orders.OrderItems"`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTraversal`] if a path names an unknown
    /// relation (before any storage access), otherwise the errors of
    /// [`load`](Self::load).
    pub async fn load_graph(
        &self,
        root: Table,
        root_id: i32,
        paths: &[&str],
    ) -> Result<Graph, GraphError> {
        let traversal = Traversal::parse(root, paths)?;
        self.load(&traversal, root_id).await
    }

    /// Load the traversal for every live row of its root table.
    ///
    /// Roots come back in primary-key order. Hops are still batched across
    /// all roots.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StorageUnavailable`] if any lookup fails.
    #[instrument(skip(self, traversal), fields(table = %traversal.root()))]
    pub async fn load_all(&self, traversal: &Traversal) -> Result<Vec<Graph>, GraphError> {
        let graphs: Vec<Graph> = match traversal {
            Traversal::User(hops) => {
                let mut nodes = self.scan::<User, UserNode>().await?;
                self.expand_users(&mut nodes, hops).await?;
                nodes.into_iter().map(Graph::User).collect()
            }
            Traversal::Address(hops) => {
                let mut nodes = self.scan::<Address, AddressNode>().await?;
                self.expand_addresses(&mut nodes, hops).await?;
                nodes.into_iter().map(Graph::Address).collect()
            }
            Traversal::Product(hops) => {
                let mut nodes = self.scan::<Product, ProductNode>().await?;
                self.expand_products(&mut nodes, hops).await?;
                nodes.into_iter().map(Graph::Product).collect()
            }
            Traversal::Order(hops) => {
                let mut nodes = self.scan::<Order, OrderNode>().await?;
                self.expand_orders(&mut nodes, hops).await?;
                nodes.into_iter().map(Graph::Order).collect()
            }
            Traversal::OrderItem(hops) => {
                let mut nodes = self.scan::<OrderItem, OrderItemNode>().await?;
                self.expand_order_items(&mut nodes, hops).await?;
                nodes.into_iter().map(Graph::OrderItem).collect()
            }
        };
        debug!(roots = graphs.len(), "graphs loaded");
        Ok(graphs)
    }

    /// Load one user and the given hops below it.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_user(&self, id: UserId, hops: &[UserHop]) -> Result<UserNode, GraphError> {
        let mut root = UserNode::from(self.fetch_root::<User>(id.as_i32()).await?);
        self.expand_users(std::slice::from_mut(&mut root), hops).await?;
        Ok(root)
    }

    /// Load one address and the given hops below it.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_address(
        &self,
        id: AddressId,
        hops: &[AddressHop],
    ) -> Result<AddressNode, GraphError> {
        let mut root = AddressNode::from(self.fetch_root::<Address>(id.as_i32()).await?);
        self.expand_addresses(std::slice::from_mut(&mut root), hops).await?;
        Ok(root)
    }

    /// Load one product and the given hops below it.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_product(
        &self,
        id: ProductId,
        hops: &[ProductHop],
    ) -> Result<ProductNode, GraphError> {
        let mut root = ProductNode::from(self.fetch_root::<Product>(id.as_i32()).await?);
        self.expand_products(std::slice::from_mut(&mut root), hops).await?;
        Ok(root)
    }

    /// Load one order and the given hops below it.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_order(&self, id: OrderId, hops: &[OrderHop]) -> Result<OrderNode, GraphError> {
        let mut root = OrderNode::from(self.fetch_root::<Order>(id.as_i32()).await?);
        self.expand_orders(std::slice::from_mut(&mut root), hops).await?;
        Ok(root)
    }

    /// Load one order item and the given hops below it.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_order_item(
        &self,
        id: OrderItemId,
        hops: &[OrderItemHop],
    ) -> Result<OrderItemNode, GraphError> {
        let mut root = OrderItemNode::from(self.fetch_root::<OrderItem>(id.as_i32()).await?);
        self.expand_order_items(std::slice::from_mut(&mut root), hops).await?;
        Ok(root)
    }

    // =========================================================================
    // Hop expansion
    // =========================================================================

    fn expand_users<'f>(
        &'f self,
        nodes: &'f mut [UserNode],
        hops: &'f [UserHop],
    ) -> BoxFuture<'f, Result<(), GraphError>> {
        async move {
            for hop in hops {
                let ids = distinct(nodes.iter().map(|n| n.user.id.as_i32()));
                match hop {
                    UserHop::Addresses(nested) => {
                        let mut children: Vec<AddressNode> =
                            self.fetch_nodes::<Address, _>(Column::UserId, &ids).await?;
                        self.expand_addresses(&mut children, nested).await?;
                        log_hop(Table::User, hop.relation(), ids.len(), children.len());
                        attach_many(
                            nodes,
                            children,
                            |n| n.user.id.as_i32(),
                            |c| c.address.user_id.as_i32(),
                            |n, c| n.addresses = Some(c),
                        );
                    }
                    UserHop::Orders(nested) => {
                        let mut children: Vec<OrderNode> =
                            self.fetch_nodes::<Order, _>(Column::UserId, &ids).await?;
                        self.expand_orders(&mut children, nested).await?;
                        log_hop(Table::User, hop.relation(), ids.len(), children.len());
                        attach_many(
                            nodes,
                            children,
                            |n| n.user.id.as_i32(),
                            |c| c.order.user_id.as_i32(),
                            |n, c| n.orders = Some(c),
                        );
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    fn expand_addresses<'f>(
        &'f self,
        nodes: &'f mut [AddressNode],
        hops: &'f [AddressHop],
    ) -> BoxFuture<'f, Result<(), GraphError>> {
        async move {
            for hop in hops {
                match hop {
                    AddressHop::User(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.address.user_id.as_i32()));
                        let mut targets: Vec<UserNode> = self.fetch_nodes::<User, _>(Column::Id, &ids).await?;
                        self.expand_users(&mut targets, nested).await?;
                        log_hop(Table::Address, hop.relation(), ids.len(), targets.len());
                        attach_one(
                            nodes,
                            targets,
                            |n| n.address.user_id.as_i32(),
                            |t| t.user.id.as_i32(),
                            |n, t| n.user = t,
                        );
                    }
                    AddressHop::Orders(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.address.id.as_i32()));
                        let mut children: Vec<OrderNode> =
                            self.fetch_nodes::<Order, _>(Column::AddressId, &ids).await?;
                        self.expand_orders(&mut children, nested).await?;
                        log_hop(Table::Address, hop.relation(), ids.len(), children.len());
                        attach_many(
                            nodes,
                            children,
                            |n| n.address.id.as_i32(),
                            |c| c.order.address_id.as_i32(),
                            |n, c| n.orders = Some(c),
                        );
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    fn expand_products<'f>(
        &'f self,
        nodes: &'f mut [ProductNode],
        hops: &'f [ProductHop],
    ) -> BoxFuture<'f, Result<(), GraphError>> {
        async move {
            for hop in hops {
                match hop {
                    ProductHop::OrderItems(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.product.id.as_i32()));
                        let mut children: Vec<OrderItemNode> =
                            self.fetch_nodes::<OrderItem, _>(Column::ProductId, &ids).await?;
                        self.expand_order_items(&mut children, nested).await?;
                        log_hop(Table::Product, hop.relation(), ids.len(), children.len());
                        attach_many(
                            nodes,
                            children,
                            |n| n.product.id.as_i32(),
                            |c| c.item.product_id.as_i32(),
                            |n, c| n.order_items = Some(c),
                        );
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    fn expand_orders<'f>(
        &'f self,
        nodes: &'f mut [OrderNode],
        hops: &'f [OrderHop],
    ) -> BoxFuture<'f, Result<(), GraphError>> {
        async move {
            for hop in hops {
                match hop {
                    OrderHop::User(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.order.user_id.as_i32()));
                        let mut targets: Vec<UserNode> = self.fetch_nodes::<User, _>(Column::Id, &ids).await?;
                        self.expand_users(&mut targets, nested).await?;
                        log_hop(Table::Order, hop.relation(), ids.len(), targets.len());
                        attach_one(
                            nodes,
                            targets,
                            |n| n.order.user_id.as_i32(),
                            |t| t.user.id.as_i32(),
                            |n, t| n.user = t,
                        );
                    }
                    OrderHop::Address(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.order.address_id.as_i32()));
                        let mut targets: Vec<AddressNode> =
                            self.fetch_nodes::<Address, _>(Column::Id, &ids).await?;
                        self.expand_addresses(&mut targets, nested).await?;
                        log_hop(Table::Order, hop.relation(), ids.len(), targets.len());
                        attach_one(
                            nodes,
                            targets,
                            |n| n.order.address_id.as_i32(),
                            |t| t.address.id.as_i32(),
                            |n, t| n.address = t,
                        );
                    }
                    OrderHop::Items(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.order.id.as_i32()));
                        let mut children: Vec<OrderItemNode> =
                            self.fetch_nodes::<OrderItem, _>(Column::OrderId, &ids).await?;
                        self.expand_order_items(&mut children, nested).await?;
                        log_hop(Table::Order, hop.relation(), ids.len(), children.len());
                        attach_many(
                            nodes,
                            children,
                            |n| n.order.id.as_i32(),
                            |c| c.item.order_id.as_i32(),
                            |n, c| n.order_items = Some(c),
                        );
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    fn expand_order_items<'f>(
        &'f self,
        nodes: &'f mut [OrderItemNode],
        hops: &'f [OrderItemHop],
    ) -> BoxFuture<'f, Result<(), GraphError>> {
        async move {
            for hop in hops {
                match hop {
                    OrderItemHop::Order(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.item.order_id.as_i32()));
                        let mut targets: Vec<OrderNode> = self.fetch_nodes::<Order, _>(Column::Id, &ids).await?;
                        self.expand_orders(&mut targets, nested).await?;
                        log_hop(Table::OrderItem, hop.relation(), ids.len(), targets.len());
                        attach_one(
                            nodes,
                            targets,
                            |n| n.item.order_id.as_i32(),
                            |t| t.order.id.as_i32(),
                            |n, t| n.order = t,
                        );
                    }
                    OrderItemHop::Product(nested) => {
                        let ids = distinct(nodes.iter().map(|n| n.item.product_id.as_i32()));
                        let mut targets: Vec<ProductNode> =
                            self.fetch_nodes::<Product, _>(Column::Id, &ids).await?;
                        self.expand_products(&mut targets, nested).await?;
                        log_hop(Table::OrderItem, hop.relation(), ids.len(), targets.len());
                        attach_one(
                            nodes,
                            targets,
                            |n| n.item.product_id.as_i32(),
                            |t| t.product.id.as_i32(),
                            |n, t| n.product = t,
                        );
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    // =========================================================================
    // Storage helpers
    // =========================================================================

    async fn fetch_root<E: Entity>(&self, id: i32) -> Result<E, GraphError> {
        let row = self
            .storage
            .fetch_by_id(E::TABLE, id)
            .await?
            .ok_or(GraphError::NotFound { table: E::TABLE, id })?;
        decode(row).map_err(GraphError::from)
    }

    /// One batched lookup for a hop. An empty ID set issues no query.
    async fn fetch_nodes<E, N>(&self, column: Column, ids: &[i32]) -> Result<Vec<N>, GraphError>
    where
        E: Entity,
        N: From<E>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .storage
            .fetch_by_parent_ids(E::TABLE, column, ids)
            .await?;
        rows.into_iter()
            .map(|row| decode::<E>(row).map(N::from).map_err(GraphError::from))
            .collect()
    }

    async fn scan<E, N>(&self) -> Result<Vec<N>, GraphError>
    where
        E: Entity,
        N: From<E>,
    {
        let rows = self.storage.fetch_all(E::TABLE).await?;
        rows.into_iter()
            .map(|row| decode::<E>(row).map(N::from).map_err(GraphError::from))
            .collect()
    }
}

fn decode<E: Entity>(row: Row) -> Result<E, StorageError> {
    E::from_row(row).map_err(|other| StorageError::UnexpectedRow {
        expected: E::TABLE,
        found: other.table(),
    })
}

fn log_hop(table: Table, relation: &'static str, keys: usize, rows: usize) {
    debug!(%table, relation, keys, rows, "expanded hop");
}

/// Distinct values in first-seen order.
fn distinct(values: impl Iterator<Item = i32>) -> Vec<i32> {
    values.collect::<Distinct<_>>().into_vec()
}

/// Move has-many children into their parents, keeping storage order.
///
/// Parents at one level are distinct rows, so each group is handed out once.
/// A parent without children gets an empty list.
fn attach_many<P, C>(
    parents: &mut [P],
    children: Vec<C>,
    parent_key: impl Fn(&P) -> i32,
    child_key: impl Fn(&C) -> i32,
    mut set: impl FnMut(&mut P, Vec<C>),
) {
    let mut groups: HashMap<i32, Vec<C>> = HashMap::new();
    for child in children {
        groups.entry(child_key(&child)).or_default().push(child);
    }
    for parent in parents {
        let key = parent_key(parent);
        set(parent, groups.remove(&key).unwrap_or_default());
    }
}

/// Copy belongs-to targets into every parent that references them.
fn attach_one<P, T: Clone>(
    parents: &mut [P],
    targets: Vec<T>,
    parent_ref: impl Fn(&P) -> i32,
    target_key: impl Fn(&T) -> i32,
    mut set: impl FnMut(&mut P, Option<Box<T>>),
) {
    let by_key: HashMap<i32, T> = targets.into_iter().map(|t| (target_key(&t), t)).collect();
    for parent in parents {
        let target = by_key.get(&parent_ref(parent)).cloned().map(Box::new);
        set(parent, target);
    }
}
