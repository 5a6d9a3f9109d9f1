//! # Expense Repository

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use tillbook_core::{Expense, ExpenseCategory, NewExpense};

use super::new_id;
use crate::error::DbResult;
use crate::store::{self, Index, KeyRange, StoreName};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    pub async fn create(&self, form: NewExpense) -> DbResult<Expense> {
        let now = Utc::now();
        let expense = form.into_expense(new_id(), now, now);

        debug!(
            id = %expense.id,
            amount = %expense.amount(),
            category = %expense.category,
            "Creating expense"
        );

        let mut conn = self.pool.acquire().await?;
        store::create(&mut *conn, &expense).await?;
        Ok(expense)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Expense>> {
        let mut conn = self.pool.acquire().await?;
        store::get(&mut *conn, id).await
    }

    pub async fn get_all(&self) -> DbResult<Vec<Expense>> {
        let mut conn = self.pool.acquire().await?;
        store::get_all(&mut *conn).await
    }

    pub async fn update(&self, mut expense: Expense) -> DbResult<Expense> {
        debug!(id = %expense.id, "Updating expense");

        expense.updated_at = Utc::now();

        let mut conn = self.pool.acquire().await?;
        store::replace(&mut *conn, &expense).await?;
        Ok(expense)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        if store::delete(&mut *conn, StoreName::Expenses, id).await? {
            info!(id = %id, "Expense deleted");
        }
        Ok(())
    }

    /// Expenses dated within `[start, end]`, oldest first.
    pub async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Expense>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(
            &mut *conn,
            Index::ExpensesByDate,
            &KeyRange::between(start, end),
        )
        .await
    }

    pub async fn find_by_category(&self, category: ExpenseCategory) -> DbResult<Vec<Expense>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(
            &mut *conn,
            Index::ExpensesByCategory,
            &KeyRange::only(category.key()),
        )
        .await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        store::count(&mut *conn, StoreName::Expenses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use tillbook_core::PaymentMethod;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn form(
        description: &str,
        cents: i64,
        category: ExpenseCategory,
        date: DateTime<Utc>,
    ) -> NewExpense {
        NewExpense {
            description: description.to_string(),
            amount_cents: cents,
            category,
            date,
            notes: None,
            payment_method: PaymentMethod::BankTransfer,
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let db = setup().await;
        let repo = db.expenses();

        let mut expense = repo
            .create(form("Aluguel da loja", 150000, ExpenseCategory::Rent, Utc::now()))
            .await
            .unwrap();
        expense.amount_cents = 160000;
        let updated = repo.update(expense).await.unwrap();
        assert_eq!(repo.get(&updated.id).await.unwrap().unwrap().amount_cents, 160000);

        repo.delete(&updated.id).await.unwrap();
        repo.delete(&updated.id).await.unwrap();
        assert!(repo.get(&updated.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_date_range_and_category() {
        let db = setup().await;
        let repo = db.expenses();
        let now = Utc::now();

        let old_bill = form(
            "Conta de luz",
            20000,
            ExpenseCategory::Utilities,
            now - Duration::days(40),
        );
        repo.create(old_bill).await.unwrap();
        let restock = form(
            "Reposição de shapes",
            80000,
            ExpenseCategory::Restock,
            now - Duration::days(3),
        );
        repo.create(restock).await.unwrap();
        repo.create(form("Conta de água", 9000, ExpenseCategory::Utilities, now))
            .await
            .unwrap();

        let month = repo
            .find_by_date_range(now - Duration::days(30), now)
            .await
            .unwrap();
        assert_eq!(month.len(), 2);
        assert_eq!(month[0].description, "Reposição de shapes");

        let utilities = repo.find_by_category(ExpenseCategory::Utilities).await.unwrap();
        assert_eq!(utilities.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
