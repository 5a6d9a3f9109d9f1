//! # Snapshots
//!
//! Whole-database export and import as one JSON document.
//!
//! ```text
//! {
//!   "products":  [ ... ],
//!   "customers": [ ... ],
//!   "sales":     [ ... ],
//!   "expenses":  [ ... ]
//! }
//! ```
//!
//! Import upserts by id inside one transaction: records already present are
//! overwritten, others are left alone. Use [`Database::clear_all`] first for
//! a full restore.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tillbook_core::{Customer, Expense, Product, Sale};

use crate::error::DbResult;
use crate::pool::Database;
use crate::store::{self, StoreName};

/// Every record of the four stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> DbResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.customers.is_empty()
            && self.sales.is_empty()
            && self.expenses.is_empty()
    }
}

/// Counts of records written by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub products: usize,
    pub customers: usize,
    pub sales: usize,
    pub expenses: usize,
    /// Ids of imported sales whose settlement fields disagree.
    pub inconsistent_sales: Vec<String>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.products + self.customers + self.sales + self.expenses
    }
}

impl Database {
    pub async fn export_snapshot(&self) -> DbResult<Snapshot> {
        let mut conn = self.pool().acquire().await?;

        let snapshot = Snapshot {
            products: store::get_all(&mut *conn).await?,
            customers: store::get_all(&mut *conn).await?,
            sales: store::get_all(&mut *conn).await?,
            expenses: store::get_all(&mut *conn).await?,
        };

        info!(
            products = snapshot.products.len(),
            customers = snapshot.customers.len(),
            sales = snapshot.sales.len(),
            expenses = snapshot.expenses.len(),
            "Snapshot exported"
        );

        Ok(snapshot)
    }

    /// Upserts every record of `snapshot`, keeping ids and timestamps.
    /// All or nothing.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> DbResult<ImportReport> {
        let mut report = ImportReport::default();
        let mut tx = self.pool().begin().await?;

        for product in &snapshot.products {
            store::put(&mut *tx, product).await?;
            report.products += 1;
        }
        for customer in &snapshot.customers {
            store::put(&mut *tx, customer).await?;
            report.customers += 1;
        }
        for sale in &snapshot.sales {
            if !sale.is_settlement_consistent() {
                warn!(id = %sale.id, "Imported sale has inconsistent settlement fields");
                report.inconsistent_sales.push(sale.id.clone());
            }
            store::put(&mut *tx, sale).await?;
            report.sales += 1;
        }
        for expense in &snapshot.expenses {
            store::put(&mut *tx, expense).await?;
            report.expenses += 1;
        }

        tx.commit().await?;

        info!(records = report.total(), "Snapshot imported");
        Ok(report)
    }

    /// Deletes every record of every store. Returns the number removed.
    pub async fn clear_all(&self) -> DbResult<u64> {
        let mut tx = self.pool().begin().await?;
        let mut removed = 0;
        for store_name in StoreName::ALL {
            removed += store::clear(&mut *tx, store_name).await?;
        }
        tx.commit().await?;

        warn!(removed = removed, "All data cleared");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
