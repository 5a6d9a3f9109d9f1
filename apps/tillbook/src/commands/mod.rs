//! # Shop Operations
//!
//! [`Shop`] is the single coordinator every presentation layer calls.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (Shop, open/reload)
//! ├── product.rs   ◄─── Product CRUD, stock, low-stock list
//! ├── customer.rs  ◄─── Customer CRUD, open tabs
//! ├── sale.rs      ◄─── Drafts, sale commit, payments
//! ├── expense.rs   ◄─── Expense CRUD and queries
//! └── report.rs    ◄─── Dashboard figures, snapshots
//! ```
//!
//! ## How Operations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shop.create_expense(form)                                              │
//! │      │                                                                  │
//! │      ├── validate form ───────────────► Err(ApiError { fields })        │
//! │      │                                                                  │
//! │      ├── db.expenses().create(form) ──► Err(ApiError) (mirror intact)   │
//! │      │                                                                  │
//! │      └── state.apply(ExpenseSaved) ───► Ok(expense)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod expense;
pub mod product;
pub mod report;
pub mod sale;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::info;

use tillbook_db::{Database, DbConfig};

use crate::error::ApiResult;
use crate::state::{AppConfig, AppState, StateAction};

/// Database, in-memory mirror and configuration of one shop.
#[derive(Debug)]
pub struct Shop {
    db: Database,
    state: RwLock<AppState>,
    config: AppConfig,
}

impl Shop {
    /// Opens the configured database and loads the mirror.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        let path = config.resolve_database_path()?;
        info!(?path, shop = %config.shop_name, "Opening shop");

        let db = Database::new(DbConfig::new(path)).await?;
        Self::with_database(db, config).await
    }

    /// Wraps an already open database and loads the mirror.
    pub async fn with_database(db: Database, config: AppConfig) -> ApiResult<Self> {
        let shop = Shop {
            db,
            state: RwLock::new(AppState::new()),
            config,
        };
        shop.reload().await?;
        Ok(shop)
    }

    /// Replaces the mirror with the current store contents.
    pub async fn reload(&self) -> ApiResult<()> {
        let action = StateAction::Loaded {
            products: self.db.products().get_all().await?,
            customers: self.db.customers().get_all().await?,
            sales: self.db.sales().get_all().await?,
            expenses: self.db.expenses().get_all().await?,
        };
        self.apply(action).await;

        let state = self.state.read().await;
        info!(
            products = state.products().len(),
            customers = state.customers().len(),
            sales = state.sales().len(),
            expenses = state.expenses().len(),
            "State loaded"
        );
        Ok(())
    }

    /// Read access to the mirror.
    pub async fn state(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().await
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn apply(&self, action: StateAction) {
        self.state.write().await.apply(action);
    }
}
