//! Loaded object graphs.
//!
//! Each node wraps one record and holds its associations as `Option`s:
//! `None` on a has-many field means the relation was not part of the
//! traversal, while a loaded relation with no rows is `Some(vec![])`. A to-one
//! field stays `None` both when it was not requested and when the referenced
//! row is gone. Unloaded associations are left out of serialized output.

use serde::Serialize;
use storegraph_core::{Address, Order, OrderItem, Product, User};

use crate::storage::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNode {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<AddressNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressNode {
    #[serde(flatten)]
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<UserNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductNode {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_items: Option<Vec<OrderItemNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderNode {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<UserNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Box<AddressNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_items: Option<Vec<OrderItemNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemNode {
    #[serde(flatten)]
    pub item: OrderItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Box<OrderNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Box<ProductNode>>,
}

impl From<User> for UserNode {
    fn from(user: User) -> Self {
        Self {
            user,
            addresses: None,
            orders: None,
        }
    }
}

impl From<Address> for AddressNode {
    fn from(address: Address) -> Self {
        Self {
            address,
            user: None,
            orders: None,
        }
    }
}

impl From<Product> for ProductNode {
    fn from(product: Product) -> Self {
        Self {
            product,
            order_items: None,
        }
    }
}

impl From<Order> for OrderNode {
    fn from(order: Order) -> Self {
        Self {
            order,
            user: None,
            address: None,
            order_items: None,
        }
    }
}

impl From<OrderItem> for OrderItemNode {
    fn from(item: OrderItem) -> Self {
        Self {
            item,
            order: None,
            product: None,
        }
    }
}

/// A loaded graph rooted at any of the five tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Graph {
    User(UserNode),
    Address(AddressNode),
    Product(ProductNode),
    Order(OrderNode),
    OrderItem(OrderItemNode),
}

impl Graph {
    /// Table of the root node.
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

    /// Primary key of the root node.
    #[must_use]
    pub const fn root_id(&self) -> i32 {
        match self {
            Self::User(n) => n.user.id.as_i32(),
            Self::Address(n) => n.address.id.as_i32(),
            Self::Product(n) => n.product.id.as_i32(),
            Self::Order(n) => n.order.id.as_i32(),
            Self::OrderItem(n) => n.item.id.as_i32(),
        }
    }
}
