//! Per-user purchase summaries and per-order totals.

#![allow(clippy::unwrap_used)]

use storegraph_core::{OrderId, OrderStatus, UserId};
use storegraph_integration_tests::{ids, money, repeat_buyer, shop};
use storegraph_query::{
    GraphError, GraphLoader, Table, UserHop, order_totals, presets, summarize_repeated_products,
    summarize_user_orders,
};

// =============================================================================
// Repeated products
// =============================================================================

#[tokio::test]
async fn test_product_bought_in_two_orders_is_repeated() {
    let storage = repeat_buyer();
    let loader = GraphLoader::new(&storage);

    let user = loader
        .load_user(UserId::new(1), &presets::user_orders())
        .await
        .unwrap();
    let summary = summarize_repeated_products(&user).unwrap();

    assert_eq!(summary.len(), 2);
    let a = summary.get("A").unwrap();
    assert_eq!(a.order_numbers, ["ORD000001", "ORD000002"]);
    assert!(a.repeated);

    let b = summary.get("B").unwrap();
    assert_eq!(b.order_numbers, ["ORD000002"]);
    assert!(!b.repeated);
}

#[tokio::test]
async fn test_shop_user_has_no_repeats() {
    let storage = shop();
    let loader = GraphLoader::new(&storage);

    let alice = loader
        .load_user(UserId::new(ids::ALICE), &presets::user_orders())
        .await
        .unwrap();
    let summary = summarize_repeated_products(&alice).unwrap();

    let names: Vec<&str> = summary.keys().map(String::as_str).collect();
    assert_eq!(names, ["Earbuds Pro", "Phone 15 Pro", "Phone Case"]);
    assert!(summary.values().all(|p| !p.repeated));
}

#[tokio::test]
async fn test_repeated_products_need_order_items() {
    let storage = repeat_buyer();
    let loader = GraphLoader::new(&storage);

    let user = loader
        .load_user(UserId::new(1), &[UserHop::Orders(Vec::new())])
        .await
        .unwrap();
    let err = summarize_repeated_products(&user).unwrap_err();
    assert!(matches!(
        err,
        GraphError::NotLoaded { table: Table::Order, relation: "OrderItems" }
    ));
}

// =============================================================================
// User order summary
// =============================================================================

#[tokio::test]
async fn test_user_summary_keeps_stored_and_summed_amounts_apart() {
    let storage = shop();
    let loader = GraphLoader::new(&storage);

    let alice = loader
        .load_user(UserId::new(ids::ALICE), &presets::user_orders())
        .await
        .unwrap();
    let summary = summarize_user_orders(&alice).unwrap();

    assert_eq!(summary.order_count, 2);
    assert_eq!(summary.status_counts.get(&OrderStatus::Paid), Some(&1));
    assert_eq!(summary.status_counts.get(&OrderStatus::Pending), Some(&1));
    // 7999.00 + (1998.00 - 99.00)
    assert_eq!(summary.stored_pay_amount, money("9898.00"));
    // 7999.00 + 1899.00 + 99.00
    assert_eq!(summary.items_subtotal, Some(money("9997.00")));
}

#[tokio::test]
async fn test_user_summary_without_items_has_no_subtotal() {
    let storage = shop();
    let loader = GraphLoader::new(&storage);

    let alice = loader
        .load_user(UserId::new(ids::ALICE), &[UserHop::Orders(Vec::new())])
        .await
        .unwrap();
    let summary = summarize_user_orders(&alice).unwrap();
    assert_eq!(summary.order_count, 2);
    assert_eq!(summary.items_subtotal, None);
}

#[tokio::test]
async fn test_user_summary_needs_orders() {
    let storage = shop();
    let loader = GraphLoader::new(&storage);

    let alice = loader
        .load_user(UserId::new(ids::ALICE), &[UserHop::Addresses(Vec::new())])
        .await
        .unwrap();
    let err = summarize_user_orders(&alice).unwrap_err();
    assert!(matches!(
        err,
        GraphError::NotLoaded { table: Table::User, relation: "Orders" }
    ));
}

// =============================================================================
// Order totals
// =============================================================================

#[tokio::test]
async fn test_discounted_order_totals() {
    let storage = shop();
    let loader = GraphLoader::new(&storage);

    let order = loader
        .load_order(OrderId::new(ids::ORDER_ACCESSORIES), &presets::order_detail())
        .await
        .unwrap();
    let totals = order_totals(&order).unwrap();

    assert_eq!(totals.stored_total_amount, money("1998.00"));
    assert_eq!(totals.stored_discount_amount, money("99.00"));
    assert_eq!(totals.stored_pay_amount, money("1899.00"));
    assert_eq!(totals.items_subtotal, money("1998.00"));
    assert_eq!(totals.item_quantity, 2);
    assert_eq!(totals.line_count, 2);
}
