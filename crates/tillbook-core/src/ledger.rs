//! # Ledger
//!
//! Shop-wide figures folded over the in-memory sale and expense collections.
//! Nothing here holds state; callers recompute on demand.
//!
//! ```text
//!   total_sales        Σ total
//!   total_paid_sales   Σ (paid ? total : total − remaining)
//!   pending_amount     Σ remaining
//!   total_expenses     Σ expense.amount
//!   balance            total_paid_sales − total_expenses
//! ```
//!
//! Only money actually received counts toward the balance. Sums saturate at
//! the `i64` bounds instead of overflowing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Expense, Product, Sale};

/// Σ sale totals.
pub fn total_sales(sales: &[Sale]) -> Money {
    sales.iter().map(Sale::total).sum()
}

/// Σ money received across all sales.
pub fn total_paid_sales(sales: &[Sale]) -> Money {
    sales.iter().map(Sale::amount_received).sum()
}

/// Σ expense amounts.
pub fn total_expenses(expenses: &[Expense]) -> Money {
    expenses.iter().map(Expense::amount).sum()
}

/// Σ outstanding balances.
pub fn pending_amount(sales: &[Sale]) -> Money {
    sales.iter().map(Sale::remaining).sum()
}

/// Received money minus expenses. May be negative.
pub fn balance(sales: &[Sale], expenses: &[Expense]) -> Money {
    total_paid_sales(sales).saturating_sub(total_expenses(expenses))
}

/// Outstanding balance of one customer.
pub fn customer_pending(sales: &[Sale], customer_id: &str) -> Money {
    sales
        .iter()
        .filter(|s| s.customer_id == customer_id)
        .map(Sale::remaining)
        .sum()
}

/// Products at or below their low-stock threshold (see
/// [`Product::is_low_stock`]).
pub fn low_stock(products: &[Product], threshold: Option<i64>) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock(threshold)).collect()
}

/// The dashboard figures in one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    pub total_sales: Money,
    pub total_paid_sales: Money,
    pub total_expenses: Money,
    pub pending_amount: Money,
    pub balance: Money,
}

impl LedgerSummary {
    pub fn compute(sales: &[Sale], expenses: &[Expense]) -> Self {
        let total_paid_sales = total_paid_sales(sales);
        let total_expenses = total_expenses(expenses);
        LedgerSummary {
            total_sales: total_sales(sales),
            total_paid_sales,
            total_expenses,
            pending_amount: pending_amount(sales),
            balance: total_paid_sales.saturating_sub(total_expenses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpenseCategory, PaymentMethod, ProductCategory};
    use chrono::Utc;

    fn sale(id: &str, customer_id: &str, total: i64, remaining: i64) -> Sale {
        let now = Utc::now();
        Sale {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            customer_name: "Cliente".to_string(),
            items: Vec::new(),
            discount_cents: 0,
            total_cents: total,
            paid: remaining == 0,
            payment_method: Some(PaymentMethod::Pix),
            notes: None,
            created_at: now,
            updated_at: now,
            payment_date: None,
            remaining_cents: remaining,
            partial_payments: Vec::new(),
            is_credit_only: true,
        }
    }

    fn expense(amount: i64) -> Expense {
        let now = Utc::now();
        Expense {
            id: "e-1".to_string(),
            description: "Frete de lixas".to_string(),
            amount_cents: amount,
            category: ExpenseCategory::Shipping,
            date: now,
            notes: None,
            payment_method: PaymentMethod::Pix,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_huge_totals_saturate() {
        let sales = vec![sale("s-1", "c-1", i64::MAX, 0), sale("s-2", "c-2", i64::MAX, 0)];
        let expenses = vec![expense(i64::MAX)];

        let summary = LedgerSummary::compute(&sales, &expenses);
        assert_eq!(summary.total_sales.cents(), i64::MAX);
        assert_eq!(summary.total_paid_sales.cents(), i64::MAX);
        assert_eq!(summary.balance, Money::zero());
    }

    #[test]
    fn test_dashboard_figures() {
        let sales = vec![sale("s-1", "c-1", 10000, 0), sale("s-2", "c-2", 5000, 2000)];
        let expenses = vec![expense(4000)];

        let summary = LedgerSummary::compute(&sales, &expenses);
        assert_eq!(summary.total_sales.cents(), 15000);
        assert_eq!(summary.total_paid_sales.cents(), 13000);
        assert_eq!(summary.pending_amount.cents(), 2000);
        assert_eq!(summary.total_expenses.cents(), 4000);
        assert_eq!(summary.balance.cents(), 9000);
        assert_eq!(balance(&sales, &expenses), summary.balance);
    }

    #[test]
    fn test_unpaid_sales_do_not_count_toward_balance() {
        let sales = vec![sale("s-1", "c-1", 8000, 8000)];
        assert!(total_paid_sales(&sales).is_zero());
        assert_eq!(balance(&sales, &[expense(1000)]).cents(), -1000);
    }

    #[test]
    fn test_empty_collections() {
        let summary = LedgerSummary::compute(&[], &[]);
        assert!(summary.total_sales.is_zero());
        assert!(summary.balance.is_zero());
    }

    #[test]
    fn test_customer_pending() {
        let sales = vec![
            sale("s-1", "c-1", 5000, 3000),
            sale("s-2", "c-1", 2000, 2000),
            sale("s-3", "c-2", 9000, 9000),
        ];
        assert_eq!(customer_pending(&sales, "c-1").cents(), 5000);
        assert!(customer_pending(&sales, "c-9").is_zero());
    }

    #[test]
    fn test_low_stock() {
        let now = Utc::now();
        let make = |id: &str, quantity: i64, min_stock: i64| Product {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            price_cents: 1000,
            cost_cents: 500,
            quantity,
            category: ProductCategory::Hardware,
            min_stock,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        let products = vec![make("a", 2, 5), make("b", 8, 10), make("c", 20, 5)];

        let ids: Vec<&str> = low_stock(&products, None).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let ids: Vec<&str> = low_stock(&products, Some(3)).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }
}
