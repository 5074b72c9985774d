//! `PostgreSQL` storage backend.
//!
//! Every statement filters `deleted_at IS NULL` and orders by primary key.
//! Batched lookups bind the whole ID set as one array parameter
//! (`column = ANY($1)`), so a hop costs one round trip no matter how many
//! parents it covers.
//!
//! Queries are built at runtime with `sqlx::query_as` from a fixed set of
//! table and column names; nothing user-supplied is ever spliced into SQL.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument};

use storegraph_core::{
    Address, AddressId, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Product, ProductId,
    ProductStatus, User, UserId, UserStatus,
};

use super::{Column, Row, StorageAccessor, StorageError, Table};

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections; callers queue beyond it.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// How long a caller waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `settings` - pool sizing and admission timeout
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    settings: &PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Internal Row Types
// =============================================================================

const USER_COLUMNS: &str =
    "id, username, phone, email, nickname, avatar, status, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, user_id, receiver_name, receiver_phone, province, city, \
     district, detail, postal_code, is_default, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, product_no, name, description, category_id, price, stock, \
     sales, image, status, sort, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, order_no, user_id, address_id, total_amount, discount_amount, \
     pay_amount, status, pay_method, pay_time, ship_time, complete_time, remark, created_at, \
     updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, product_image, price, \
     quantity, subtotal, created_at, updated_at";

fn corrupt(err: impl std::fmt::Display) -> StorageError {
    StorageError::DataCorruption(err.to_string())
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    phone: Option<String>,
    email: Option<String>,
    nickname: Option<String>,
    avatar: Option<String>,
    status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            phone: row.phone,
            email: row.email,
            nickname: row.nickname,
            avatar: row.avatar,
            status: UserStatus::try_from(row.status).map_err(corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    receiver_name: String,
    receiver_phone: String,
    province: String,
    city: String,
    district: String,
    detail: String,
    postal_code: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AddressRow> for Address {
    type Error = StorageError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            receiver_name: row.receiver_name,
            receiver_phone: row.receiver_phone,
            province: row.province,
            city: row.city,
            district: row.district,
            detail: row.detail,
            postal_code: row.postal_code,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    product_no: String,
    name: String,
    description: Option<String>,
    category_id: Option<i32>,
    price: Decimal,
    stock: i32,
    sales: i32,
    image: Option<String>,
    status: i16,
    sort: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StorageError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            product_no: row.product_no,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            price: row.price,
            stock: row.stock,
            sales: row.sales,
            image: row.image,
            status: ProductStatus::try_from(row.status).map_err(corrupt)?,
            sort: row.sort,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_no: String,
    user_id: i32,
    address_id: i32,
    total_amount: Decimal,
    discount_amount: Decimal,
    pay_amount: Decimal,
    status: i16,
    pay_method: Option<String>,
    pay_time: Option<DateTime<Utc>>,
    ship_time: Option<DateTime<Utc>>,
    complete_time: Option<DateTime<Utc>>,
    remark: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StorageError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row.id),
            order_no: row.order_no,
            user_id: UserId::new(row.user_id),
            address_id: AddressId::new(row.address_id),
            total_amount: row.total_amount,
            discount_amount: row.discount_amount,
            pay_amount: row.pay_amount,
            status: OrderStatus::try_from(row.status).map_err(corrupt)?,
            pay_method: row.pay_method,
            pay_time: row.pay_time,
            ship_time: row.ship_time,
            complete_time: row.complete_time,
            remark: row.remark,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    product_image: Option<String>,
    price: Decimal,
    quantity: i32,
    subtotal: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = StorageError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            product_image: row.product_image,
            price: row.price,
            quantity: row.quantity,
            subtotal: row.subtotal,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const fn select_columns(table: Table) -> &'static str {
    match table {
        Table::User => USER_COLUMNS,
        Table::Address => ADDRESS_COLUMNS,
        Table::Product => PRODUCT_COLUMNS,
        Table::Order => ORDER_COLUMNS,
        Table::OrderItem => ORDER_ITEM_COLUMNS,
    }
}

/// Build the SELECT for `table`, optionally restricted to `column = ANY($1)`.
fn select_sql(table: Table, filter: Option<Column>) -> String {
    let columns = select_columns(table);
    let name = table.sql_name();
    filter.map_or_else(
        || format!("SELECT {columns} FROM {name} WHERE deleted_at IS NULL ORDER BY id"),
        |column| {
            format!(
                "SELECT {columns} FROM {name} WHERE deleted_at IS NULL AND {} = ANY($1) ORDER BY id",
                column.sql_name()
            )
        },
    )
}

fn decode<R, E>(rows: Vec<R>) -> Result<Vec<Row>, StorageError>
where
    E: TryFrom<R, Error = StorageError>,
    Row: From<E>,
{
    rows.into_iter()
        .map(|row| E::try_from(row).map(Row::from))
        .collect()
}

// =============================================================================
// Storage
// =============================================================================

/// Storage accessor over a shared `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn query_rows<R>(&self, sql: &str, ids: Option<Vec<i32>>) -> Result<Vec<R>, StorageError>
    where
        R: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let query = sqlx::query_as::<Postgres, R>(sql);
        let query = match ids {
            Some(ids) => query.bind(ids),
            None => query,
        };
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn select(
        &self,
        table: Table,
        filter: Option<(Column, Vec<i32>)>,
    ) -> Result<Vec<Row>, StorageError> {
        let (column, ids) = filter.unzip();
        let sql = select_sql(table, column);
        let rows = match table {
            Table::User => decode::<_, User>(self.query_rows::<UserRow>(&sql, ids).await?)?,
            Table::Address => {
                decode::<_, Address>(self.query_rows::<AddressRow>(&sql, ids).await?)?
            }
            Table::Product => {
                decode::<_, Product>(self.query_rows::<ProductRow>(&sql, ids).await?)?
            }
            Table::Order => decode::<_, Order>(self.query_rows::<OrderRow>(&sql, ids).await?)?,
            Table::OrderItem => {
                decode::<_, OrderItem>(self.query_rows::<OrderItemRow>(&sql, ids).await?)?
            }
        };
        debug!(%table, rows = rows.len(), "select");
        Ok(rows)
    }
}

impl StorageAccessor for PgStorage {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_by_id(&self, table: Table, id: i32) -> Result<Option<Row>, StorageError> {
        let rows = self.select(table, Some((Column::Id, vec![id]))).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), level = "debug")]
    async fn fetch_by_parent_ids(
        &self,
        table: Table,
        column: Column,
        ids: &[i32],
    ) -> Result<Vec<Row>, StorageError> {
        self.select(table, Some((column, ids.to_vec()))).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_all(&self, table: Table) -> Result<Vec<Row>, StorageError> {
        self.select(table, None).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
