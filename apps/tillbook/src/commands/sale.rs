//! # Sale Operations
//!
//! ## Counter Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleDraft::new()                                                       │
//! │      │                                                                  │
//! │      ├── shop.draft_select_customer(&mut draft, id)                     │
//! │      ├── shop.draft_add_item(&mut draft, product_id, qty)  (repeat)     │
//! │      ├── draft.set_discount(..) / draft.remove_item(..)                 │
//! │      ▼                                                                  │
//! │  shop.create_sale(&draft, PaymentTerms::Full { method } | Deferred)     │
//! │      │   one transaction: insert sale + decrement stock                 │
//! │      ▼                                                                  │
//! │  shop.record_payment(sale_id, amount, "PIX")   (for open sales)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use tillbook_core::{Money, PaymentMethod, PaymentOutcome, PaymentTerms, Sale, SaleDraft};

use super::Shop;
use crate::error::ApiResult;
use crate::state::StateAction;

impl Shop {
    /// Selects the draft's customer from the mirror.
    pub async fn draft_select_customer(
        &self,
        draft: &mut SaleDraft,
        customer_id: &str,
    ) -> ApiResult<()> {
        let state = self.state().await;
        draft.select_customer(&*state, customer_id)?;
        Ok(())
    }

    /// Adds an item to the draft, priced and stock-checked from the mirror.
    pub async fn draft_add_item(
        &self,
        draft: &mut SaleDraft,
        product_id: &str,
        quantity: i64,
    ) -> ApiResult<()> {
        let state = self.state().await;
        draft.add_item(&*state, product_id, quantity)?;
        Ok(())
    }

    /// Commits the draft. Stock is re-checked inside the commit, so a draft
    /// built against stale stock fails cleanly.
    pub async fn create_sale(&self, draft: &SaleDraft, terms: PaymentTerms) -> ApiResult<Sale> {
        debug!(items = draft.items().len(), ?terms, "create_sale");

        let new_sale = draft.finalize(terms, Utc::now())?;
        let commit = self.db.sales().create(new_sale).await?;

        for product in commit.updated_products {
            self.apply(StateAction::ProductSaved(product)).await;
        }
        self.apply(StateAction::SaleSaved(commit.sale.clone())).await;

        info!(id = %commit.sale.id, total = %commit.sale.total(), "Sale created");
        Ok(commit.sale)
    }

    /// Records an installment. `method` is a payment method label or key.
    pub async fn record_payment(
        &self,
        sale_id: &str,
        amount: Money,
        method: &str,
    ) -> ApiResult<PaymentOutcome> {
        debug!(sale_id = %sale_id, amount = %amount, method = %method, "record_payment");

        let method: PaymentMethod = method.parse()?;
        let (sale, outcome) = self.db.sales().record_payment(sale_id, amount, method).await?;
        self.apply(StateAction::SaleSaved(sale)).await;

        Ok(outcome)
    }

    /// Saves edits to notes and settlement fields. Items and stock are not
    /// re-evaluated. Settlement fields that disagree are a validation error,
    /// and neither the store nor the mirror changes.
    pub async fn update_sale(&self, sale: Sale) -> ApiResult<Sale> {
        debug!(id = %sale.id, "update_sale");
        let sale = self.db.sales().update(sale).await?;
        self.apply(StateAction::SaleSaved(sale.clone())).await;
        Ok(sale)
    }

    /// Removes the sale. Stock is not restored.
    pub async fn delete_sale(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "delete_sale");
        self.db.sales().delete(id).await?;
        self.apply(StateAction::SaleDeleted(id.to_string())).await;
        Ok(())
    }

    pub async fn pending_sales(&self) -> ApiResult<Vec<Sale>> {
        Ok(self.db.sales().find_pending().await?)
    }

    pub async fn sales_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Vec<Sale>> {
        Ok(self.db.sales().find_by_date_range(start, end).await?)
    }
}
