//! storegraph CLI - reports over the shop database.
//!
//! # Usage
//!
//! ```bash
//! # List all users
//! sg-cli users
//!
//! # A user's orders with their items
//! sg-cli user-orders 1
//!
//! # Sales statistics for a product
//! sg-cli product-stats 1
//!
//! # Any graph from dotted relation paths
//! sg-cli graph order 1 --include User --include OrderItems.Product
//! ```
//!
//! Every command prints one JSON document `{code, message, data}` to stdout.
//! Logs go to stderr.
//!
//! # Commands
//!
//! - `users`, `products`, `orders` - List rows
//! - `user-orders`, `user-products`, `repeated-products`, `user-summary` - User reports
//! - `product`, `product-orders`, `product-stats` - Product reports
//! - `order`, `order-products` - Order reports
//! - `graph` - Load a graph from relation paths
//! - `health` - Check the database connection

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use storegraph_core::{OrderId, ProductId, UserId};
use storegraph_query::storage::{PgStorage, create_pool};
use storegraph_query::{GraphLoader, StorageAccessor, Table};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use config::{CliConfig, LogConfig, LogFormat};
use output::{CliError, Envelope, write_envelope};

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(author, version, about = "Reports over the storegraph shop database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the database connection
    Health,
    /// List all users
    Users,
    /// List all products
    Products,
    /// List all orders with buyer and items
    Orders,
    /// A user's orders with their items, plus addresses
    UserOrders {
        /// User ID
        id: i32,
    },
    /// A user's orders with items and products
    UserProducts {
        /// User ID
        id: i32,
    },
    /// Products a user bought, and whether they bought them more than once
    RepeatedProducts {
        /// User ID
        id: i32,
    },
    /// Order counts and amounts for a user
    UserSummary {
        /// User ID
        id: i32,
    },
    /// One product
    Product {
        /// Product ID
        id: i32,
    },
    /// A product with the orders and buyers that bought it
    ProductOrders {
        /// Product ID
        id: i32,
    },
    /// Sales statistics for a product
    ProductStats {
        /// Product ID
        id: i32,
    },
    /// An order with buyer, address, items, products and totals
    Order {
        /// Order ID
        id: i32,
    },
    /// An order's items with their products
    OrderProducts {
        /// Order ID
        id: i32,
    },
    /// Load any graph from dotted relation paths
    Graph {
        /// Root table (`user`, `address`, `product`, `order`, `order_item`)
        table: Table,
        /// Root row ID
        id: i32,
        /// Relation path to load, e.g. `Orders.OrderItems.Product`
        #[arg(short, long = "include", value_name = "PATH")]
        include: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match LogConfig::from_env() {
        Ok(log) => {
            init_tracing(log.format);
            run(cli).await
        }
        Err(e) => {
            init_tracing(LogFormat::Text);
            Err(e.into())
        }
    };

    match result {
        Ok(data) => respond(&Envelope::ok(data)),
        Err(e) => {
            tracing::error!(code = e.code(), "Command failed: {e}");
            respond(&Envelope::error(&e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storegraph_query=info,storegraph_cli=info".into());

    let json = format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn respond<T: Serialize>(envelope: &Envelope<T>) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    match write_envelope(&mut stdout, envelope) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to write response: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Value, CliError> {
    let config = CliConfig::from_env()?;

    let pool = create_pool(&config.database_url, &config.pool).await?;
    tracing::info!(
        max_connections = config.pool.max_connections,
        "Database pool created"
    );

    let storage = PgStorage::new(pool);
    let loader = GraphLoader::new(&storage);
    let data = execute(&loader, cli.command).await?;
    tracing::info!("Command complete");
    Ok(data)
}

async fn execute<S: StorageAccessor>(
    loader: &GraphLoader<'_, S>,
    command: Commands,
) -> Result<Value, CliError> {
    use commands::{graph, health, orders, products, users};

    let data = match command {
        Commands::Health => serde_json::to_value(health::check(loader).await?)?,
        Commands::Users => serde_json::to_value(users::list(loader).await?)?,
        Commands::Products => serde_json::to_value(products::list(loader).await?)?,
        Commands::Orders => serde_json::to_value(orders::list(loader).await?)?,
        Commands::UserOrders { id } => {
            serde_json::to_value(users::orders(loader, UserId::new(id)).await?)?
        }
        Commands::UserProducts { id } => {
            serde_json::to_value(users::products(loader, UserId::new(id)).await?)?
        }
        Commands::RepeatedProducts { id } => {
            serde_json::to_value(users::repeated_products(loader, UserId::new(id)).await?)?
        }
        Commands::UserSummary { id } => {
            serde_json::to_value(users::summary(loader, UserId::new(id)).await?)?
        }
        Commands::Product { id } => {
            serde_json::to_value(products::show(loader, ProductId::new(id)).await?)?
        }
        Commands::ProductOrders { id } => {
            serde_json::to_value(products::orders(loader, ProductId::new(id)).await?)?
        }
        Commands::ProductStats { id } => {
            serde_json::to_value(products::stats(loader, ProductId::new(id)).await?)?
        }
        Commands::Order { id } => {
            serde_json::to_value(orders::detail(loader, OrderId::new(id)).await?)?
        }
        Commands::OrderProducts { id } => {
            serde_json::to_value(orders::products(loader, OrderId::new(id)).await?)?
        }
        Commands::Graph { table, id, include } => {
            serde_json::to_value(graph::load(loader, table, id, &include).await?)?
        }
    };
    Ok(data)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storegraph_integration_tests::{ids, repeat_buyer, shop};

    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(std::iter::once("sg-cli").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_parse_graph_command() {
        let command = parse(&["graph", "order_items", "4", "-i", "Order", "--include", "Product"]);
        match command {
            Commands::Graph { table, id, include } => {
                assert_eq!(table, Table::OrderItem);
                assert_eq!(id, 4);
                assert_eq!(include, ["Order", "Product"]);
            }
            _ => panic!("expected graph command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_table() {
        let result = Cli::try_parse_from(["sg-cli", "graph", "carts", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_report_commands() {
        assert!(matches!(parse(&["user-orders", "7"]), Commands::UserOrders { id: 7 }));
        assert!(matches!(parse(&["product-stats", "2"]), Commands::ProductStats { id: 2 }));
        assert!(matches!(parse(&["orders"]), Commands::Orders));
        assert!(matches!(parse(&["health"]), Commands::Health));
    }

    #[tokio::test]
    async fn test_execute_health() {
        let mut storage = shop();
        let data = execute(&GraphLoader::new(&storage), Commands::Health)
            .await
            .unwrap();
        assert_eq!(data["status"], "ok");

        storage.set_unavailable(Table::User, true);
        let err = execute(&GraphLoader::new(&storage), Commands::Health)
            .await
            .unwrap_err();
        assert_eq!(err.code(), 503);
    }

    #[tokio::test]
    async fn test_execute_product_stats() {
        let storage = shop();
        let loader = GraphLoader::new(&storage);

        let data = execute(&loader, Commands::ProductStats { id: ids::EARBUDS })
            .await
            .unwrap();
        assert_eq!(data["product"]["name"], "Earbuds Pro");
        assert_eq!(data["total_quantity"], 1);
        assert_eq!(data["total_amount"], "1899.00");
        assert_eq!(data["order_count"], 1);
    }

    #[tokio::test]
    async fn test_execute_repeated_products() {
        let storage = repeat_buyer();
        let loader = GraphLoader::new(&storage);

        let data = execute(&loader, Commands::RepeatedProducts { id: 1 })
            .await
            .unwrap();
        assert_eq!(data["products"]["A"]["repeated"], true);
        assert_eq!(data["products"]["B"]["repeated"], false);
    }

    #[tokio::test]
    async fn test_execute_order_includes_totals() {
        let storage = shop();
        let loader = GraphLoader::new(&storage);

        let data = execute(&loader, Commands::Order { id: ids::ORDER_ACCESSORIES })
            .await
            .unwrap();
        assert_eq!(data["order"]["user"]["username"], "alice");
        assert_eq!(data["totals"]["stored_pay_amount"], "1899.00");
        assert_eq!(data["totals"]["items_subtotal"], "1998.00");
    }

    #[tokio::test]
    async fn test_execute_missing_order_maps_to_404() {
        let storage = shop();
        let loader = GraphLoader::new(&storage);

        let err = execute(&loader, Commands::Order { id: 999 }).await.unwrap_err();
        assert_eq!(err.code(), 404);
    }

    #[tokio::test]
    async fn test_execute_bad_path_maps_to_400() {
        let storage = shop();
        let loader = GraphLoader::new(&storage);

        let err = execute(
            &loader,
            Commands::Graph {
                table: Table::User,
                id: ids::ALICE,
                include: vec!["Wishlist".to_owned()],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), 400);
    }

    #[tokio::test]
    async fn test_execute_lists_orders_with_buyers() {
        let storage = shop();
        let loader = GraphLoader::new(&storage);

        let data = execute(&loader, Commands::Orders).await.unwrap();
        let orders = data.as_array().unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders.first().unwrap()["user"]["username"], "alice");
    }
}
