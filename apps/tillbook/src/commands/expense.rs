//! # Expense Operations

use chrono::{DateTime, Utc};
use tracing::debug;

use tillbook_core::validation::validate_expense;
use tillbook_core::{Expense, ExpenseCategory, NewExpense};

use super::Shop;
use crate::error::ApiResult;
use crate::state::StateAction;

impl Shop {
    pub async fn create_expense(&self, form: NewExpense) -> ApiResult<Expense> {
        debug!(description = %form.description, "create_expense");
        validate_expense(&form, Utc::now())?;

        let expense = self.db.expenses().create(form).await?;
        self.apply(StateAction::ExpenseSaved(expense.clone())).await;
        Ok(expense)
    }

    pub async fn update_expense(&self, expense: Expense) -> ApiResult<Expense> {
        debug!(id = %expense.id, "update_expense");
        let form = NewExpense {
            description: expense.description.clone(),
            amount_cents: expense.amount_cents,
            category: expense.category,
            date: expense.date,
            notes: expense.notes.clone(),
            payment_method: expense.payment_method,
        };
        validate_expense(&form, Utc::now())?;

        let expense = self.db.expenses().update(expense).await?;
        self.apply(StateAction::ExpenseSaved(expense.clone())).await;
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "delete_expense");
        self.db.expenses().delete(id).await?;
        self.apply(StateAction::ExpenseDeleted(id.to_string())).await;
        Ok(())
    }

    pub async fn expenses_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Vec<Expense>> {
        Ok(self.db.expenses().find_by_date_range(start, end).await?)
    }

    pub async fn expenses_by_category(&self, category: ExpenseCategory) -> ApiResult<Vec<Expense>> {
        Ok(self.db.expenses().find_by_category(category).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::error::ErrorCode;
    use chrono::{Duration, Utc};
    use tillbook_core::{ExpenseCategory, NewExpense, PaymentMethod};

    fn form(description: &str, amount_cents: i64) -> NewExpense {
        NewExpense {
            description: description.to_string(),
            amount_cents,
            category: ExpenseCategory::Utilities,
            date: Utc::now() - Duration::days(1),
            notes: None,
            payment_method: PaymentMethod::Pix,
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let shop = shop().await;
        let mut expense = shop.create_expense(form("Conta de luz", 20000)).await.unwrap();
        assert_eq!(shop.state().await.expense(&expense.id), Some(&expense));

        expense.category = ExpenseCategory::Rent;
        let updated = shop.update_expense(expense).await.unwrap();
        assert_eq!(shop.expenses_by_category(ExpenseCategory::Rent).await.unwrap().len(), 1);

        shop.delete_expense(&updated.id).await.unwrap();
        assert!(shop.state().await.expenses().is_empty());
    }

    #[tokio::test]
    async fn test_validation() {
        let shop = shop().await;

        let err = shop.create_expense(form("Luz", 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("description").is_some());
        assert!(err.field("amount").is_some());

        let mut future = form("Aluguel adiantado", 1000);
        future.date = Utc::now() + Duration::days(3);
        let err = shop.create_expense(future).await.unwrap_err();
        assert!(err.field("date").is_some());

        let err = shop
            .create_expense(form("Reforma da loja", 100_000_001))
            .await
            .unwrap_err();
        assert!(err.field("amount").is_some());

        assert!(shop.state().await.expenses().is_empty());
    }

    #[tokio::test]
    async fn test_expenses_between() {
        let shop = shop().await;
        shop.create_expense(form("Conta de luz", 20000)).await.unwrap();
        let mut old = form("Conta de água", 9000);
        old.date = Utc::now() - Duration::days(45);
        shop.create_expense(old).await.unwrap();

        let now = Utc::now();
        let month = shop
            .expenses_between(now - Duration::days(30), now)
            .await
            .unwrap();
        assert_eq!(month.len(), 1);
    }
}
