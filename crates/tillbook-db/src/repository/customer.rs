//! # Customer Repository
//!
//! Customers are referenced by sales through `customer_id`; deleting a
//! customer leaves their sales in place (the sale keeps `customer_name`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use tillbook_core::{Customer, NewCustomer, Sale};

use super::new_id;
use crate::error::DbResult;
use crate::store::{self, Index, KeyRange, StoreName};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, form: NewCustomer) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = form.into_customer(new_id(), now, now);

        debug!(id = %customer.id, name = %customer.name, "Creating customer");

        let mut conn = self.pool.acquire().await?;
        store::create(&mut *conn, &customer).await?;
        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        store::get(&mut *conn, id).await
    }

    pub async fn get_all(&self) -> DbResult<Vec<Customer>> {
        let mut conn = self.pool.acquire().await?;
        store::get_all(&mut *conn).await
    }

    pub async fn update(&self, mut customer: Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Updating customer");

        customer.updated_at = Utc::now();

        let mut conn = self.pool.acquire().await?;
        store::replace(&mut *conn, &customer).await?;
        Ok(customer)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        if store::delete(&mut *conn, StoreName::Customers, id).await? {
            info!(id = %id, "Customer deleted");
        }
        Ok(())
    }

    /// Exact phone match. Phones are not unique, so this may return several.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Vec<Customer>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(
            &mut *conn,
            Index::CustomersByPhone,
            &KeyRange::only(phone.trim()),
        )
        .await
    }

    /// The customer's sales with money still owed, oldest first.
    pub async fn pending_sales(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        let sales: Vec<Sale> = store::query_by_index(
            &mut *conn,
            Index::SalesByCustomer,
            &KeyRange::only(customer_id),
        )
        .await?;

        Ok(sales
            .into_iter()
            .filter(Sale::is_pending)
            .collect())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        store::count(&mut *conn, StoreName::Customers).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
