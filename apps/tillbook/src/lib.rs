//! # Tillbook
//!
//! Coordinator library for the Tillbook shop: configuration, logging, the
//! in-memory mirror and every shop operation.
//!
//! ## Module Organization
//! ```text
//! tillbook/
//! ├── lib.rs          ◄─── You are here (startup, logging)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState mirror + StateAction
//! │   └── config.rs   ◄─── AppConfig (toml + env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shop coordinator
//! │   ├── product.rs
//! │   ├── customer.rs
//! │   ├── sale.rs
//! │   ├── expense.rs
//! │   └── report.rs   ◄─── Dashboard, snapshots
//! ├── input.rs        ◄─── Typed amount parsing
//! └── error.rs        ◄─── ApiError for callers
//! ```

pub mod commands;
pub mod error;
pub mod input;
pub mod state;

use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use commands::report::Dashboard;
pub use commands::Shop;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppConfig, AppState, StateAction};

/// Boots the shop and logs the dashboard figures.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration (defaults < tillbook.toml < TILLBOOK_*)          │
/// │  2. Initialize logging (RUST_LOG, else the configured filter)           │
/// │  3. Open the database, run pending migrations                           │
/// │  4. Load the in-memory mirror                                           │
/// │  5. Log dashboard figures                                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> ApiResult<()> {
    let config = AppConfig::load(config_path)?;
    init_tracing(&config.log_filter);

    info!(shop = %config.shop_name, "Starting Tillbook");

    let shop = Shop::open(config).await?;
    let dashboard = shop.dashboard().await;
    let config = shop.config();

    info!(
        products = dashboard.product_count,
        customers = dashboard.customer_count,
        open_sales = dashboard.open_sale_count,
        low_stock = dashboard.low_stock_count,
        "Shop ready"
    );
    info!(
        total_sales = %config.format_currency(dashboard.summary.total_sales),
        received = %config.format_currency(dashboard.summary.total_paid_sales),
        expenses = %config.format_currency(dashboard.summary.total_expenses),
        pending = %config.format_currency(dashboard.summary.pending_amount),
        balance = %config.format_currency(dashboard.summary.balance),
        "Ledger"
    );

    shop.database().close().await;
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding apps).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
