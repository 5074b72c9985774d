//! Statistics folded out of loaded graphs.
//!
//! Aggregates never query storage. They read what the loader attached and
//! fail with [`GraphError::NotLoaded`] when an association they need was not
//! part of the traversal, rather than treating it as empty.
//!
//! Stored order amounts and sums of item subtotals are reported side by side
//! under different names. Neither is derived from the other.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::Serialize;

use storegraph_core::OrderStatus;

use crate::error::GraphError;
use crate::graph::{OrderItemNode, OrderNode, ProductNode, UserNode};
use crate::storage::Table;

/// Values in first-insertion order with duplicates dropped.
#[derive(Debug, Clone)]
pub struct Distinct<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T> Default for Distinct<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> Distinct<T> {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value. Returns `false` if it was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    /// Number of distinct values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been inserted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values in the order they were first inserted.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume the set, keeping insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for Distinct<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut distinct = Self::new();
        for value in iter {
            distinct.insert(value);
        }
        distinct
    }
}

// =============================================================================
// Product sales
// =============================================================================

/// Sales figures for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesStats {
    /// Sum of item quantities.
    pub total_quantity: i64,
    /// Sum of item subtotals as recorded at purchase time.
    pub total_amount: Decimal,
    /// Number of distinct orders among the items.
    pub order_count: usize,
    /// `total_amount / order_count`, or zero without orders.
    pub average_amount: Decimal,
}

/// Fold a product's order items into [`SalesStats`].
///
/// Only the items are read; the `Order` association under each item does not
/// need to be loaded.
///
/// # Errors
///
/// Returns [`GraphError::NotLoaded`] if the product was loaded without its
/// `OrderItems`.
pub fn aggregate_product_sales(product: &ProductNode) -> Result<SalesStats, GraphError> {
    let items = loaded(product.order_items.as_deref(), Table::Product, "OrderItems")?;

    let mut total_quantity = 0_i64;
    let mut total_amount = Decimal::ZERO;
    let mut orders = Distinct::new();
    for node in items {
        total_quantity += i64::from(node.item.quantity);
        total_amount += node.item.subtotal;
        orders.insert(node.item.order_id);
    }

    let order_count = orders.len();
    let average_amount = total_amount
        .checked_div(Decimal::from(order_count))
        .unwrap_or(Decimal::ZERO);

    Ok(SalesStats {
        total_quantity,
        total_amount,
        order_count,
        average_amount,
    })
}

// =============================================================================
// Repeated purchases
// =============================================================================

/// Orders a product name appeared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductOccurrences {
    /// Distinct order numbers, in the order they were met.
    pub order_numbers: Vec<String>,
    /// Whether the product was bought in two or more orders.
    pub repeated: bool,
}

/// Group a user's order items by product name and list the orders for each.
///
/// Items are keyed by the name snapshot on the item, so a product renamed
/// after purchase still groups under the name it was bought as. Buying the
/// same product twice in one order counts as one order.
///
/// # Errors
///
/// Returns [`GraphError::NotLoaded`] if the user's `Orders`, or any order's
/// `OrderItems`, were not loaded.
pub fn summarize_repeated_products(
    user: &UserNode,
) -> Result<BTreeMap<String, ProductOccurrences>, GraphError> {
    let orders = loaded(user.orders.as_deref(), Table::User, "Orders")?;

    let mut by_name: BTreeMap<String, Distinct<String>> = BTreeMap::new();
    for order in orders {
        for node in order_items(order)? {
            by_name
                .entry(node.item.product_name.clone())
                .or_default()
                .insert(order.order.order_no.clone());
        }
    }

    Ok(by_name
        .into_iter()
        .map(|(name, orders)| {
            let order_numbers = orders.into_vec();
            let repeated = order_numbers.len() >= 2;
            (
                name,
                ProductOccurrences {
                    order_numbers,
                    repeated,
                },
            )
        })
        .collect())
}

// =============================================================================
// Order totals
// =============================================================================

/// Stored amounts of an order next to the figures summed from its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub stored_total_amount: Decimal,
    pub stored_discount_amount: Decimal,
    pub stored_pay_amount: Decimal,
    /// Sum of item subtotals.
    pub items_subtotal: Decimal,
    /// Sum of item quantities.
    pub item_quantity: i64,
    /// Number of order lines.
    pub line_count: usize,
}

/// Report an order's stored amounts and its item sums.
///
/// # Errors
///
/// Returns [`GraphError::NotLoaded`] if the order was loaded without its
/// `OrderItems`.
pub fn order_totals(order: &OrderNode) -> Result<OrderTotals, GraphError> {
    let items = order_items(order)?;
    Ok(OrderTotals {
        stored_total_amount: order.order.total_amount,
        stored_discount_amount: order.order.discount_amount,
        stored_pay_amount: order.order.pay_amount,
        items_subtotal: items.iter().map(|n| n.item.subtotal).sum(),
        item_quantity: items.iter().map(|n| i64::from(n.item.quantity)).sum(),
        line_count: items.len(),
    })
}

// =============================================================================
// User order summary
// =============================================================================

/// Overview of a user's orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOrderSummary {
    pub order_count: usize,
    /// Order count per status. Statuses without orders are absent.
    pub status_counts: BTreeMap<OrderStatus, usize>,
    /// Sum of the stored pay amounts.
    pub stored_pay_amount: Decimal,
    /// Sum of item subtotals across all orders, if every order has its items
    /// loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_subtotal: Option<Decimal>,
}

/// Count a user's orders by status and total what they paid.
///
/// # Errors
///
/// Returns [`GraphError::NotLoaded`] if the user was loaded without `Orders`.
pub fn summarize_user_orders(user: &UserNode) -> Result<UserOrderSummary, GraphError> {
    let orders = loaded(user.orders.as_deref(), Table::User, "Orders")?;

    let mut status_counts = BTreeMap::new();
    let mut stored_pay_amount = Decimal::ZERO;
    let mut items_subtotal = Some(Decimal::ZERO);
    for node in orders {
        *status_counts.entry(node.order.status).or_insert(0) += 1;
        stored_pay_amount += node.order.pay_amount;
        items_subtotal = match (items_subtotal, node.order_items.as_deref()) {
            (Some(sum), Some(items)) => {
                Some(sum + items.iter().map(|n| n.item.subtotal).sum::<Decimal>())
            }
            _ => None,
        };
    }

    Ok(UserOrderSummary {
        order_count: orders.len(),
        status_counts,
        stored_pay_amount,
        items_subtotal,
    })
}

fn order_items(order: &OrderNode) -> Result<&[OrderItemNode], GraphError> {
    loaded(order.order_items.as_deref(), Table::Order, "OrderItems")
}

fn loaded<'g, T>(
    association: Option<&'g [T]>,
    table: Table,
    relation: &'static str,
) -> Result<&'g [T], GraphError> {
    association.ok_or(GraphError::NotLoaded { table, relation })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use storegraph_core::{
        AddressId, Order, OrderId, OrderItem, OrderItemId, Product, ProductId, ProductStatus,
        User, UserId, UserStatus,
    };

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product_node(items: Option<Vec<OrderItemNode>>) -> ProductNode {
        ProductNode {
            product: Product {
                id: ProductId::new(1),
                product_no: "P001".to_owned(),
                name: "Teapot".to_owned(),
                description: None,
                category_id: None,
                price: dec("100.00"),
                stock: 5,
                sales: 0,
                image: None,
                status: ProductStatus::OnSale,
                sort: 0,
                created_at: at(),
                updated_at: at(),
            },
            order_items: items,
        }
    }

    fn item(id: i32, order_id: i32, name: &str, quantity: i32, subtotal: &str) -> OrderItemNode {
        OrderItemNode::from(OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(order_id),
            product_id: ProductId::new(1),
            product_name: name.to_owned(),
            product_image: None,
            price: dec(subtotal),
            quantity,
            subtotal: dec(subtotal),
            created_at: at(),
            updated_at: at(),
        })
    }

    fn order(
        id: i32,
        status: OrderStatus,
        pay: &str,
        items: Option<Vec<OrderItemNode>>,
    ) -> OrderNode {
        OrderNode {
            order: Order {
                id: OrderId::new(id),
                order_no: format!("ORD{id}"),
                user_id: UserId::new(1),
                address_id: AddressId::new(1),
                total_amount: dec(pay),
                discount_amount: Decimal::ZERO,
                pay_amount: dec(pay),
                status,
                pay_method: None,
                pay_time: None,
                ship_time: None,
                complete_time: None,
                remark: None,
                created_at: at(),
                updated_at: at(),
            },
            user: None,
            address: None,
            order_items: items,
        }
    }

    fn user_node(orders: Option<Vec<OrderNode>>) -> UserNode {
        UserNode {
            user: User {
                id: UserId::new(1),
                username: "alice".to_owned(),
                phone: None,
                email: None,
                nickname: None,
                avatar: None,
                status: UserStatus::Normal,
                created_at: at(),
                updated_at: at(),
            },
            addresses: None,
            orders,
        }
    }

    // =========================================================================
    // Distinct
    // =========================================================================

    #[test]
    fn test_distinct_keeps_first_occurrence_order() {
        let distinct: Distinct<&str> = ["b", "a", "b", "c", "a"].into_iter().collect();
        assert_eq!(distinct.as_slice(), ["b", "a", "c"]);
        assert_eq!(distinct.len(), 3);
        assert!(!distinct.is_empty());
        assert_eq!(distinct.into_vec(), ["b", "a", "c"]);
        assert!(Distinct::<i32>::new().is_empty());
    }

    // =========================================================================
    // aggregate_product_sales
    // =========================================================================

    #[test]
    fn test_sales_counts_distinct_orders() {
        let product = product_node(Some(vec![
            item(1, 10, "Teapot", 2, "200.00"),
            item(2, 10, "Teapot", 1, "100.00"),
            item(3, 11, "Teapot", 1, "90.00"),
        ]));

        let stats = aggregate_product_sales(&product).unwrap();
        assert_eq!(stats.total_quantity, 4);
        assert_eq!(stats.total_amount, dec("390.00"));
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.average_amount, dec("195"));
    }

    #[test]
    fn test_sales_without_items_are_zero() {
        let stats = aggregate_product_sales(&product_node(Some(Vec::new()))).unwrap();
        assert_eq!(
            stats,
            SalesStats {
                total_quantity: 0,
                total_amount: Decimal::ZERO,
                order_count: 0,
                average_amount: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn test_sales_require_loaded_items() {
        let err = aggregate_product_sales(&product_node(None)).unwrap_err();
        assert!(matches!(
            err,
            GraphError::NotLoaded { table: Table::Product, relation: "OrderItems" }
        ));
    }

    // =========================================================================
    // summarize_repeated_products
    // =========================================================================

    #[test]
    fn test_repeated_products_across_orders() {
        let user = user_node(Some(vec![
            order(1, OrderStatus::Paid, "100.00", Some(vec![item(1, 1, "A", 1, "100.00")])),
            order(
                2,
                OrderStatus::Pending,
                "150.00",
                Some(vec![item(2, 2, "A", 1, "100.00"), item(3, 2, "B", 1, "50.00")]),
            ),
        ]));

        let summary = summarize_repeated_products(&user).unwrap();
        let names: Vec<&str> = summary.keys().map(String::as_str).collect();
        assert_eq!(names, ["A", "B"]);

        let a = summary.get("A").unwrap();
        assert_eq!(a.order_numbers, ["ORD1", "ORD2"]);
        assert!(a.repeated);

        let b = summary.get("B").unwrap();
        assert_eq!(b.order_numbers, ["ORD2"]);
        assert!(!b.repeated);
    }

    #[test]
    fn test_same_product_twice_in_one_order_is_not_repeated() {
        let user = user_node(Some(vec![order(
            1,
            OrderStatus::Paid,
            "200.00",
            Some(vec![item(1, 1, "A", 1, "100.00"), item(2, 1, "A", 1, "100.00")]),
        )]));

        let summary = summarize_repeated_products(&user).unwrap();
        let a = summary.get("A").unwrap();
        assert_eq!(a.order_numbers, ["ORD1"]);
        assert!(!a.repeated);
    }

    #[test]
    fn test_repeated_products_require_items_on_every_order() {
        let user = user_node(Some(vec![order(1, OrderStatus::Paid, "1.00", None)]));
        let err = summarize_repeated_products(&user).unwrap_err();
        assert!(matches!(
            err,
            GraphError::NotLoaded { table: Table::Order, relation: "OrderItems" }
        ));
    }

    #[test]
    fn test_user_without_orders_has_empty_summary() {
        let summary = summarize_repeated_products(&user_node(Some(Vec::new()))).unwrap();
        assert!(summary.is_empty());
    }

    // =========================================================================
    // order_totals / summarize_user_orders
    // =========================================================================

    #[test]
    fn test_order_totals_keep_stored_and_summed_apart() {
        // Stored pay amount reflects a discount the items know nothing about.
        let mut node = order(
            1,
            OrderStatus::Paid,
            "140.00",
            Some(vec![item(1, 1, "A", 1, "100.00"), item(2, 1, "B", 2, "50.00")]),
        );
        node.order.total_amount = dec("150.00");
        node.order.discount_amount = dec("10.00");

        let totals = order_totals(&node).unwrap();
        assert_eq!(totals.stored_total_amount, dec("150.00"));
        assert_eq!(totals.stored_discount_amount, dec("10.00"));
        assert_eq!(totals.stored_pay_amount, dec("140.00"));
        assert_eq!(totals.items_subtotal, dec("150.00"));
        assert_eq!(totals.item_quantity, 3);
        assert_eq!(totals.line_count, 2);
    }

    #[test]
    fn test_user_summary_counts_statuses() {
        let user = user_node(Some(vec![
            order(1, OrderStatus::Paid, "100.00", Some(vec![item(1, 1, "A", 1, "100.00")])),
            order(2, OrderStatus::Pending, "50.00", Some(vec![item(2, 2, "B", 1, "50.00")])),
            order(3, OrderStatus::Paid, "25.00", Some(Vec::new())),
        ]));

        let summary = summarize_user_orders(&user).unwrap();
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.status_counts.get(&OrderStatus::Paid), Some(&2));
        assert_eq!(summary.status_counts.get(&OrderStatus::Pending), Some(&1));
        assert_eq!(summary.status_counts.get(&OrderStatus::Cancelled), None);
        assert_eq!(summary.stored_pay_amount, dec("175.00"));
        assert_eq!(summary.items_subtotal, Some(dec("150.00")));
    }

    #[test]
    fn test_user_summary_without_items_omits_subtotal() {
        let user = user_node(Some(vec![order(1, OrderStatus::Shipped, "10.00", None)]));
        let summary = summarize_user_orders(&user).unwrap();
        assert_eq!(summary.items_subtotal, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("items_subtotal").is_none());
        assert_eq!(json["status_counts"]["shipped"], 1);
    }
}
