//! Invariants of graph loading and sales aggregation over generated shops.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::future::Future;

use proptest::prelude::*;
use rust_decimal::Decimal;
use storegraph_core::{OrderStatus, ProductId};
use storegraph_integration_tests::{address, order, order_item, product, user};
use storegraph_query::{GraphLoader, MemoryStorage, Traversal, aggregate_product_sales, presets};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// An order line of the sold product: order ID, quantity, unit price in cents.
type Line = (i32, i32, i64);

/// An order: buyer, then lines of (product ID, quantity).
type GeneratedOrder = (i32, Vec<(i32, i32)>);

fn arb_lines() -> impl Strategy<Value = Vec<Line>> {
    prop::collection::vec((1..=5_i32, 1..=20_i32, 0..=1_000_000_i64), 0..40)
}

fn arb_orders() -> impl Strategy<Value = Vec<GeneratedOrder>> {
    prop::collection::vec(
        (1..=3_i32, prop::collection::vec((1..=3_i32, 1..=5_i32), 0..4)),
        0..8,
    )
}

/// Product 1 sold on `lines`, spread over orders 1 to 5 of a single buyer.
fn sales_shop(lines: &[Line]) -> MemoryStorage {
    let sold = product(1, "Sold", "1.00");
    let mut storage = MemoryStorage::new()
        .with(user(1, "buyer"))
        .with(address(1, 1, "Springfield"));
    for id in 1..=5 {
        storage.insert(order(id, 1, 1, OrderStatus::Paid, "0.00", "0.00"));
    }
    for (id, &(order_id, quantity, cents)) in (1..).zip(lines) {
        let mut item = order_item(id, order_id, &sold, quantity);
        item.price = Decimal::new(cents, 2);
        item.subtotal = item.price * Decimal::from(quantity);
        storage.insert(item);
    }
    storage.with(sold)
}

/// Three users with one address each, three products, and `orders`.
fn generated_shop(orders: &[GeneratedOrder]) -> MemoryStorage {
    let products = [
        product(1, "A", "10.00"),
        product(2, "B", "20.00"),
        product(3, "C", "30.00"),
    ];
    let mut storage = MemoryStorage::new();
    for id in 1..=3 {
        storage.insert(user(id, &format!("user{id}")));
        storage.insert(address(id, id, "Springfield"));
    }

    let mut item_id = 0;
    for (order_id, (buyer, lines)) in (1..).zip(orders) {
        storage.insert(order(order_id, *buyer, *buyer, OrderStatus::Paid, "0.00", "0.00"));
        for &(product_id, quantity) in lines {
            item_id += 1;
            let sold = products
                .iter()
                .find(|p| p.id == ProductId::new(product_id))
                .unwrap();
            storage.insert(order_item(item_id, order_id, sold, quantity));
        }
    }
    for sold in products {
        storage.insert(sold);
    }
    storage
}

proptest! {
    #[test]
    fn prop_sales_stats_match_item_sums(lines in arb_lines()) {
        let storage = sales_shop(&lines);
        let loader = GraphLoader::new(&storage);
        let node = block_on(loader.load_product(ProductId::new(1), &presets::product_sales()))
            .unwrap();
        let stats = aggregate_product_sales(&node).unwrap();

        let quantity: i64 = lines.iter().map(|&(_, q, _)| i64::from(q)).sum();
        let amount: Decimal = lines
            .iter()
            .map(|&(_, q, cents)| Decimal::new(cents, 2) * Decimal::from(q))
            .sum();
        let orders: HashSet<i32> = lines.iter().map(|&(order_id, _, _)| order_id).collect();

        prop_assert_eq!(stats.total_quantity, quantity);
        prop_assert_eq!(stats.total_amount, amount);
        prop_assert_eq!(stats.order_count, orders.len());
        prop_assert!(stats.order_count <= lines.len());
        if stats.order_count == 0 {
            prop_assert_eq!(stats.average_amount, Decimal::ZERO);
        } else {
            prop_assert_eq!(stats.average_amount, amount / Decimal::from(orders.len()));
        }
    }

    #[test]
    fn prop_repeated_loads_are_identical(orders in arb_orders(), root in 1..=3_i32) {
        let storage = generated_shop(&orders);
        let loader = GraphLoader::new(&storage);
        let traversal = Traversal::from(presets::user_orders_with_products());

        let first = block_on(loader.load(&traversal, root)).unwrap();
        let second = block_on(loader.load(&traversal, root)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_load_all_agrees_with_single_loads(orders in arb_orders()) {
        let storage = generated_shop(&orders);
        let loader = GraphLoader::new(&storage);
        let traversal = Traversal::from(presets::order_detail());

        let all = block_on(loader.load_all(&traversal)).unwrap();
        prop_assert_eq!(all.len(), orders.len());
        for graph in all {
            let single = block_on(loader.load(&traversal, graph.root_id())).unwrap();
            prop_assert_eq!(graph, single);
        }
    }
}
