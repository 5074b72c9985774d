//! Shared fixtures for the storegraph scenario tests.
//!
//! Scenarios run against [`MemoryStorage`], so no database is needed:
//!
//! ```bash
//! cargo test -p storegraph-integration-tests
//! ```
//!
//! # Fixtures
//!
//! - [`shop`] - a small shop: three users, three addresses, four products,
//!   three orders and four order lines
//! - [`repeat_buyer`] - one user who bought the same product in two orders
//! - builder functions ([`user`], [`address`], [`product`], [`order`],
//!   [`order_item`]) for ad-hoc rows

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use storegraph_core::{
    Address, AddressId, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Product, ProductId,
    ProductStatus, User, UserId, UserStatus,
};
use storegraph_query::MemoryStorage;

/// IDs of the rows in [`shop`].
pub mod ids {
    pub const ALICE: i32 = 1;
    pub const BOB: i32 = 2;
    pub const CAROL: i32 = 3;

    pub const ALICE_HOME: i32 = 1;
    pub const ALICE_OFFICE: i32 = 2;
    pub const BOB_HOME: i32 = 3;

    pub const PHONE: i32 = 1;
    pub const EARBUDS: i32 = 2;
    pub const LAPTOP: i32 = 3;
    pub const PHONE_CASE: i32 = 4;

    /// Alice, paid: one phone.
    pub const ORDER_PHONE: i32 = 1;
    /// Alice, pending: earbuds and a phone case, with a discount.
    pub const ORDER_ACCESSORIES: i32 = 2;
    /// Bob, shipped: one laptop.
    pub const ORDER_LAPTOP: i32 = 3;
}

/// Fixed timestamp used for every fixture row.
#[must_use]
pub fn timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_243_200, 0).unwrap_or_default()
}

/// Parse a decimal literal.
///
/// # Panics
///
/// Panics if `value` is not a decimal number.
#[must_use]
pub fn money(value: &str) -> Decimal {
    match value.parse() {
        Ok(amount) => amount,
        Err(e) => panic!("bad fixture amount {value:?}: {e}"),
    }
}

#[must_use]
pub fn user(id: i32, username: &str) -> User {
    User {
        id: UserId::new(id),
        username: username.to_owned(),
        phone: None,
        email: Some(format!("{username}@example.com")),
        nickname: None,
        avatar: None,
        status: UserStatus::Normal,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[must_use]
pub fn address(id: i32, user_id: i32, city: &str) -> Address {
    Address {
        id: AddressId::new(id),
        user_id: UserId::new(user_id),
        receiver_name: format!("Receiver {user_id}"),
        receiver_phone: "555-0100".to_owned(),
        province: "State".to_owned(),
        city: city.to_owned(),
        district: "Central".to_owned(),
        detail: format!("{id} Main Street"),
        postal_code: None,
        is_default: false,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[must_use]
pub fn product(id: i32, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        product_no: format!("P{id:04}"),
        name: name.to_owned(),
        description: None,
        category_id: Some(id),
        price: money(price),
        stock: 100,
        sales: 0,
        image: None,
        status: ProductStatus::OnSale,
        sort: id,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// An order whose stored amounts are `total - discount = pay`.
#[must_use]
pub fn order(
    id: i32,
    user_id: i32,
    address_id: i32,
    status: OrderStatus,
    total: &str,
    discount: &str,
) -> Order {
    let total_amount = money(total);
    let discount_amount = money(discount);
    Order {
        id: OrderId::new(id),
        order_no: format!("ORD{id:06}"),
        user_id: UserId::new(user_id),
        address_id: AddressId::new(address_id),
        total_amount,
        discount_amount,
        pay_amount: total_amount - discount_amount,
        status,
        pay_method: None,
        pay_time: None,
        ship_time: None,
        complete_time: None,
        remark: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// An order line snapshotting `product` at its current name and price.
#[must_use]
pub fn order_item(id: i32, order_id: i32, product: &Product, quantity: i32) -> OrderItem {
    OrderItem {
        id: OrderItemId::new(id),
        order_id: OrderId::new(order_id),
        product_id: product.id,
        product_name: product.name.clone(),
        product_image: product.image.clone(),
        price: product.price,
        quantity,
        subtotal: product.price * Decimal::from(quantity),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// The sample shop. Carol has no addresses and no orders.
#[must_use]
pub fn shop() -> MemoryStorage {
    let phone = product(ids::PHONE, "Phone 15 Pro", "7999.00");
    let earbuds = product(ids::EARBUDS, "Earbuds Pro", "1899.00");
    let laptop = product(ids::LAPTOP, "Laptop Pro 14", "14999.00");
    let case = product(ids::PHONE_CASE, "Phone Case", "99.00");

    let mut home = address(ids::ALICE_HOME, ids::ALICE, "Springfield");
    home.is_default = true;
    let mut bob_home = address(ids::BOB_HOME, ids::BOB, "Shelbyville");
    bob_home.is_default = true;

    MemoryStorage::new()
        .with(user(ids::ALICE, "alice"))
        .with(user(ids::BOB, "bob"))
        .with(user(ids::CAROL, "carol"))
        .with(home)
        .with(address(ids::ALICE_OFFICE, ids::ALICE, "Springfield"))
        .with(bob_home)
        .with(order(
            ids::ORDER_PHONE,
            ids::ALICE,
            ids::ALICE_HOME,
            OrderStatus::Paid,
            "7999.00",
            "0.00",
        ))
        .with(order(
            ids::ORDER_ACCESSORIES,
            ids::ALICE,
            ids::ALICE_HOME,
            OrderStatus::Pending,
            "1998.00",
            "99.00",
        ))
        .with(order(
            ids::ORDER_LAPTOP,
            ids::BOB,
            ids::BOB_HOME,
            OrderStatus::Shipped,
            "14999.00",
            "0.00",
        ))
        .with(order_item(1, ids::ORDER_PHONE, &phone, 1))
        .with(order_item(2, ids::ORDER_ACCESSORIES, &earbuds, 1))
        .with(order_item(3, ids::ORDER_ACCESSORIES, &case, 1))
        .with(order_item(4, ids::ORDER_LAPTOP, &laptop, 1))
        .with(phone)
        .with(earbuds)
        .with(laptop)
        .with(case)
}

/// User 1 with order 1 (paid: A x1 @ 100.00) and order 2
/// (pending: A x1 @ 100.00, B x1 @ 50.00).
#[must_use]
pub fn repeat_buyer() -> MemoryStorage {
    let a = product(1, "A", "100.00");
    let b = product(2, "B", "50.00");
    MemoryStorage::new()
        .with(user(1, "repeat"))
        .with(address(1, 1, "Springfield"))
        .with(order(1, 1, 1, OrderStatus::Paid, "100.00", "0.00"))
        .with(order(2, 1, 1, OrderStatus::Pending, "150.00", "0.00"))
        .with(order_item(1, 1, &a, 1))
        .with(order_item(2, 2, &a, 1))
        .with(order_item(3, 2, &b, 1))
        .with(a)
        .with(b)
}
