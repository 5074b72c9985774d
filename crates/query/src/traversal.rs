//! Typed traversal trees.
//!
//! A traversal says which associations to load below a root row. Each table
//! has its own hop enum whose variants are exactly the relations that table
//! defines, and every variant carries the hops to apply to the rows it loads:
//!
//! ```text
//! User      -> Addresses, Orders
//! Address   -> User, Orders
//! Order     -> User, Address, OrderItems
//! OrderItem -> Order, Product
//! Product   -> OrderItems
//! ```
//!
//! A typed tree cannot name a relation its table lacks. Dotted string paths
//! (`"Orders.OrderItems.Product"`) are still accepted through
//! [`Traversal::parse`], which is the only place an unknown relation can show
//! up.

use crate::error::GraphError;
use crate::storage::Table;

/// Relations loadable from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserHop {
    /// `addresses.user_id = users.id`
    Addresses(Vec<AddressHop>),
    /// `orders.user_id = users.id`
    Orders(Vec<OrderHop>),
}

/// Relations loadable from an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressHop {
    /// `users.id = addresses.user_id`
    User(Vec<UserHop>),
    /// `orders.address_id = addresses.id`
    Orders(Vec<OrderHop>),
}

/// Relations loadable from an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderHop {
    /// `users.id = orders.user_id`
    User(Vec<UserHop>),
    /// `addresses.id = orders.address_id`
    Address(Vec<AddressHop>),
    /// `order_items.order_id = orders.id`
    Items(Vec<OrderItemHop>),
}

/// Relations loadable from an order item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderItemHop {
    /// `orders.id = order_items.order_id`
    Order(Vec<OrderHop>),
    /// `products.id = order_items.product_id`
    Product(Vec<ProductHop>),
}

/// Relations loadable from a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductHop {
    /// `order_items.product_id = products.id`
    OrderItems(Vec<OrderItemHop>),
}

/// A root table plus the hops to load below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    User(Vec<UserHop>),
    Address(Vec<AddressHop>),
    Product(Vec<ProductHop>),
    Order(Vec<OrderHop>),
    OrderItem(Vec<OrderItemHop>),
}

impl Traversal {
    /// A traversal that loads only the root row.
    #[must_use]
    pub const fn bare(root: Table) -> Self {
        match root {
            Table::User => Self::User(Vec::new()),
            Table::Address => Self::Address(Vec::new()),
            Table::Product => Self::Product(Vec::new()),
            Table::Order => Self::Order(Vec::new()),
            Table::OrderItem => Self::OrderItem(Vec::new()),
        }
    }

    /// Table the traversal starts from.
    #[must_use]
    pub const fn root(&self) -> Table {
        match self {
            Self::User(_) => Table::User,
            Self::Address(_) => Table::Address,
            Self::Product(_) => Table::Product,
            Self::Order(_) => Table::Order,
            Self::OrderItem(_) => Table::OrderItem,
        }
    }

    /// Build a traversal from dotted relation paths.
    ///
    /// Paths that share a prefix share the hop (`"Orders"` and
    /// `"Orders.OrderItems"` load orders once), and a deep path implies its
    /// prefixes. Relation names are the ones listed in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTraversal`] if a segment is empty or names
    /// a relation the table at that depth does not define.
    pub fn parse(root: Table, paths: &[&str]) -> Result<Self, GraphError> {
        let mut traversal = Self::bare(root);
        for path in paths {
            let segments: Vec<&str> = path.split('.').collect();
            match &mut traversal {
                Self::User(hops) => insert_path(hops, &segments)?,
                Self::Address(hops) => insert_path(hops, &segments)?,
                Self::Product(hops) => insert_path(hops, &segments)?,
                Self::Order(hops) => insert_path(hops, &segments)?,
                Self::OrderItem(hops) => insert_path(hops, &segments)?,
            }
        }
        Ok(traversal)
    }
}

macro_rules! impl_from_hops {
    ($hop:ident => $variant:ident) => {
        impl From<Vec<$hop>> for Traversal {
            fn from(hops: Vec<$hop>) -> Self {
                Self::$variant(hops)
            }
        }
    };
}

impl_from_hops!(UserHop => User);
impl_from_hops!(AddressHop => Address);
impl_from_hops!(ProductHop => Product);
impl_from_hops!(OrderHop => Order);
impl_from_hops!(OrderItemHop => OrderItem);

/// Fixed traversal shapes used by the reports.
///
/// Each preset returns the typed hops for its root table, so it can be passed
/// straight to the matching `GraphLoader::load_*` method or wrapped in a
/// [`Traversal`] with `.into()`.
pub mod presets {
    use super::{OrderHop, OrderItemHop, ProductHop, UserHop};

    /// User with orders and their items, plus the user's addresses.
    #[must_use]
    pub fn user_orders() -> Vec<UserHop> {
        vec![
            UserHop::Orders(vec![OrderHop::Items(Vec::new())]),
            UserHop::Addresses(Vec::new()),
        ]
    }

    /// User with orders, their items, and each item's product.
    #[must_use]
    pub fn user_orders_with_products() -> Vec<UserHop> {
        vec![UserHop::Orders(vec![OrderHop::Items(vec![
            OrderItemHop::Product(Vec::new()),
        ])])]
    }

    /// Product with the items that bought it, their orders and buyers.
    #[must_use]
    pub fn product_orders() -> Vec<ProductHop> {
        vec![ProductHop::OrderItems(vec![OrderItemHop::Order(vec![
            OrderHop::User(Vec::new()),
        ])])]
    }

    /// Product with its items and their orders.
    #[must_use]
    pub fn product_sales() -> Vec<ProductHop> {
        vec![ProductHop::OrderItems(vec![OrderItemHop::Order(Vec::new())])]
    }

    /// Order with buyer, shipping address, items and products.
    #[must_use]
    pub fn order_detail() -> Vec<OrderHop> {
        vec![
            OrderHop::User(Vec::new()),
            OrderHop::Address(Vec::new()),
            OrderHop::Items(vec![OrderItemHop::Product(Vec::new())]),
        ]
    }

    /// Order with items, their products, and the buyer.
    #[must_use]
    pub fn order_products() -> Vec<OrderHop> {
        vec![
            OrderHop::Items(vec![OrderItemHop::Product(Vec::new())]),
            OrderHop::User(Vec::new()),
        ]
    }

    /// Order with buyer and items, for listings.
    #[must_use]
    pub fn orders_overview() -> Vec<OrderHop> {
        vec![OrderHop::User(Vec::new()), OrderHop::Items(Vec::new())]
    }
}

/// A per-table hop enum that can be built from relation names.
pub(crate) trait NamedHop: Sized {
    const TABLE: Table;

    /// A hop for `name` with no nested hops yet.
    fn named(name: &str) -> Option<Self>;

    /// Relation name of this hop.
    fn relation(&self) -> &'static str;

    /// Add the remaining path segments below this hop.
    fn extend(&mut self, rest: &[&str]) -> Result<(), GraphError>;
}

fn insert_path<H: NamedHop>(hops: &mut Vec<H>, segments: &[&str]) -> Result<(), GraphError> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };
    let hop = H::named(first).ok_or_else(|| GraphError::InvalidTraversal {
        table: H::TABLE,
        relation: (*first).to_owned(),
    })?;

    let relation = hop.relation();
    let index = hops
        .iter()
        .position(|h| h.relation() == relation)
        .unwrap_or_else(|| {
            hops.push(hop);
            hops.len() - 1
        });
    hops.get_mut(index).map_or(Ok(()), |existing| existing.extend(rest))
}

impl NamedHop for UserHop {
    const TABLE: Table = Table::User;

    fn named(name: &str) -> Option<Self> {
        match name {
            "Addresses" => Some(Self::Addresses(Vec::new())),
            "Orders" => Some(Self::Orders(Vec::new())),
            _ => None,
        }
    }

    fn relation(&self) -> &'static str {
        match self {
            Self::Addresses(_) => "Addresses",
            Self::Orders(_) => "Orders",
        }
    }

    fn extend(&mut self, rest: &[&str]) -> Result<(), GraphError> {
        match self {
            Self::Addresses(nested) => insert_path(nested, rest),
            Self::Orders(nested) => insert_path(nested, rest),
        }
    }
}

impl NamedHop for AddressHop {
    const TABLE: Table = Table::Address;

    fn named(name: &str) -> Option<Self> {
        match name {
            "User" => Some(Self::User(Vec::new())),
            "Orders" => Some(Self::Orders(Vec::new())),
            _ => None,
        }
    }

    fn relation(&self) -> &'static str {
        match self {
            Self::User(_) => "User",
            Self::Orders(_) => "Orders",
        }
    }

    fn extend(&mut self, rest: &[&str]) -> Result<(), GraphError> {
        match self {
            Self::User(nested) => insert_path(nested, rest),
            Self::Orders(nested) => insert_path(nested, rest),
        }
    }
}

impl NamedHop for OrderHop {
    const TABLE: Table = Table::Order;

    fn named(name: &str) -> Option<Self> {
        match name {
            "User" => Some(Self::User(Vec::new())),
            "Address" => Some(Self::Address(Vec::new())),
            "OrderItems" => Some(Self::Items(Vec::new())),
            _ => None,
        }
    }

    fn relation(&self) -> &'static str {
        match self {
            Self::User(_) => "User",
            Self::Address(_) => "Address",
            Self::Items(_) => "OrderItems",
        }
    }

    fn extend(&mut self, rest: &[&str]) -> Result<(), GraphError> {
        match self {
            Self::User(nested) => insert_path(nested, rest),
            Self::Address(nested) => insert_path(nested, rest),
            Self::Items(nested) => insert_path(nested, rest),
        }
    }
}

impl NamedHop for OrderItemHop {
    const TABLE: Table = Table::OrderItem;

    fn named(name: &str) -> Option<Self> {
        match name {
            "Order" => Some(Self::Order(Vec::new())),
            "Product" => Some(Self::Product(Vec::new())),
            _ => None,
        }
    }

    fn relation(&self) -> &'static str {
        match self {
            Self::Order(_) => "Order",
            Self::Product(_) => "Product",
        }
    }

    fn extend(&mut self, rest: &[&str]) -> Result<(), GraphError> {
        match self {
            Self::Order(nested) => insert_path(nested, rest),
            Self::Product(nested) => insert_path(nested, rest),
        }
    }
}

impl NamedHop for ProductHop {
    const TABLE: Table = Table::Product;

    fn named(name: &str) -> Option<Self> {
        match name {
            "OrderItems" => Some(Self::OrderItems(Vec::new())),
            _ => None,
        }
    }

    fn relation(&self) -> &'static str {
        match self {
            Self::OrderItems(_) => "OrderItems",
        }
    }

    fn extend(&mut self, rest: &[&str]) -> Result<(), GraphError> {
        match self {
            Self::OrderItems(nested) => insert_path(nested, rest),
        }
    }
}
