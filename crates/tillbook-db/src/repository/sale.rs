//! # Sale Repository
//!
//! Sales, their stock effects and their settlement.
//!
//! ## Sale Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT sale                                                          │
//! │    for each item (skipped for credit-only sales):                       │
//! │      load product ──► take_stock(qty) ──► UPDATE product                │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure (unknown product, oversell) rolls the whole thing back:    │
//! │  no sale row, no stock change.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payments are read-modify-write on a single sale, also in a transaction.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use tillbook_core::{CoreError, Money, NewSale, PaymentMethod, PaymentOutcome, Product, Sale};

use super::new_id;
use crate::error::{DbError, DbResult};
use crate::store::{self, Index, KeyRange, StoreName};

/// A committed sale and the products whose stock it changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleCommit {
    pub sale: Sale,
    /// Final state of each touched product, one entry per product.
    pub updated_products: Vec<Product>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Commits a finalized sale, decrementing stock for every item.
    ///
    /// A sale whose settlement fields disagree is rejected with
    /// `CoreError::InconsistentSettlement` before anything is written.
    pub async fn create(&self, new_sale: NewSale) -> DbResult<SaleCommit> {
        self.create_at(new_sale, Utc::now()).await
    }

    /// [`create`](Self::create) with an explicit creation time.
    pub async fn create_at(&self, new_sale: NewSale, now: DateTime<Utc>) -> DbResult<SaleCommit> {
        let sale = new_sale.into_sale(new_id(), now);
        ensure_consistent(&sale)?;

        debug!(
            id = %sale.id,
            customer = %sale.customer_name,
            items = sale.items.len(),
            total = %sale.total(),
            credit_only = sale.is_credit_only,
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;

        store::create(&mut *tx, &sale).await?;

        let mut updated_products: Vec<Product> = Vec::new();
        if !sale.is_credit_only {
            for item in &sale.items {
                let mut product: Product = store::get(&mut *tx, &item.product_id)
                    .await?
                    .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

                product.take_stock(item.quantity)?;
                product.updated_at = now;
                store::replace(&mut *tx, &product).await?;

                match updated_products.iter_mut().find(|p| p.id == product.id) {
                    Some(existing) => *existing = product,
                    None => updated_products.push(product),
                }
            }
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            total = %sale.total(),
            paid = sale.paid,
            "Sale committed"
        );

        Ok(SaleCommit {
            sale,
            updated_products,
        })
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        store::get(&mut *conn, id).await
    }

    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        store::get_all(&mut *conn).await
    }

    /// Writes the full record with a fresh `updated_at`. Stock is not touched.
    ///
    /// Rejects a sale whose settlement fields disagree; the stored record is
    /// left as it was.
    pub async fn update(&self, mut sale: Sale) -> DbResult<Sale> {
        debug!(id = %sale.id, "Updating sale");
        ensure_consistent(&sale)?;

        sale.updated_at = Utc::now();

        let mut conn = self.pool.acquire().await?;
        store::replace(&mut *conn, &sale).await?;
        Ok(sale)
    }

    /// Removes the sale. Stock already taken is not restored.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        if store::delete(&mut *conn, StoreName::Sales, id).await? {
            info!(id = %id, "Sale deleted");
        }
        Ok(())
    }

    /// Sales not paid or with money still owed, oldest first.
    ///
    /// Unpaid sales come from the `paid` index. Paid sales only show up when
    /// they still carry a balance, which only an imported record can do.
    pub async fn find_pending(&self) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        let mut pending: Vec<Sale> =
            store::query_by_index(&mut *conn, Index::SalesByPaid, &KeyRange::only(false)).await?;
        let paid: Vec<Sale> =
            store::query_by_index(&mut *conn, Index::SalesByPaid, &KeyRange::only(true)).await?;

        pending.extend(paid.into_iter().filter(Sale::is_pending));
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }

    pub async fn find_by_paid(&self, paid: bool) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(&mut *conn, Index::SalesByPaid, &KeyRange::only(paid)).await
    }

    /// Sales created within `[start, end]`, oldest first.
    pub async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(
            &mut *conn,
            Index::SalesByCreatedAt,
            &KeyRange::between(start, end),
        )
        .await
    }

    pub async fn find_by_customer_id(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(
            &mut *conn,
            Index::SalesByCustomer,
            &KeyRange::only(customer_id),
        )
        .await
    }

    /// Records one payment against a sale's balance.
    ///
    /// ## Returns
    /// The saved sale and how the amount was applied. Overpayment comes back
    /// as `change`; the stored installment is capped at the balance.
    pub async fn record_payment(
        &self,
        id: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> DbResult<(Sale, PaymentOutcome)> {
        debug!(id = %id, amount = %amount, method = %method, "Recording payment");

        let mut tx = self.pool.begin().await?;

        let mut sale: Sale = store::get(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let now = Utc::now();
        let outcome = sale.record_payment(amount, method, now)?;
        sale.updated_at = now;

        store::replace(&mut *tx, &sale).await?;
        tx.commit().await?;

        info!(
            id = %id,
            applied = %outcome.applied,
            remaining = %outcome.remaining,
            status = ?outcome.status,
            "Payment recorded"
        );

        Ok((sale, outcome))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        store::count(&mut *conn, StoreName::Sales).await
    }
}

fn ensure_consistent(sale: &Sale) -> DbResult<()> {
    if sale.is_settlement_consistent() {
        return Ok(());
    }
    warn!(
        id = %sale.id,
        paid = sale.paid,
        remaining = sale.remaining_cents,
        total = sale.total_cents,
        "Rejecting sale with inconsistent settlement fields"
    );
    Err(CoreError::InconsistentSettlement {
        sale_id: sale.id.clone(),
    }
    .into())
}

// =============================================================================
// Unit Tests
// =============================================================================
