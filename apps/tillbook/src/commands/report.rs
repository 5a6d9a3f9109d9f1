//! # Reports and Data Management
//!
//! Dashboard figures come from the in-memory mirror; snapshots go through
//! the database and reload the mirror afterwards.

use serde::Serialize;
use tracing::{info, warn};

use tillbook_core::ledger::{self, LedgerSummary};
use tillbook_db::{ImportReport, Snapshot};

use super::Shop;
use crate::error::ApiResult;

/// What the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: LedgerSummary,
    pub product_count: usize,
    pub customer_count: usize,
    pub open_sale_count: usize,
    pub low_stock_count: usize,
}

impl Shop {
    pub async fn dashboard(&self) -> Dashboard {
        let state = self.state().await;
        let summary = LedgerSummary::compute(state.sales(), state.expenses());
        let low_stock_count =
            ledger::low_stock(state.products(), self.config.low_stock_threshold).len();
        let open_sale_count = state.sales().iter().filter(|s| s.is_pending()).count();

        Dashboard {
            summary,
            product_count: state.products().len(),
            customer_count: state.customers().len(),
            open_sale_count,
            low_stock_count,
        }
    }

    pub async fn export_snapshot(&self) -> ApiResult<Snapshot> {
        Ok(self.db.export_snapshot().await?)
    }

    /// Upserts the snapshot and reloads the mirror.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> ApiResult<ImportReport> {
        let report = self.db.import_snapshot(snapshot).await?;
        if !report.inconsistent_sales.is_empty() {
            warn!(
                count = report.inconsistent_sales.len(),
                "Imported sales with inconsistent settlement fields"
            );
        }
        self.reload().await?;
        info!(records = report.total(), "Import complete");
        Ok(report)
    }

    /// Deletes all data in every store and empties the mirror.
    pub async fn clear_all(&self) -> ApiResult<u64> {
        let removed = self.db.clear_all().await?;
        self.reload().await?;
        Ok(removed)
    }
}
