//! # Customer Operations

use tracing::debug;

use tillbook_core::validation::validate_customer;
use tillbook_core::{ledger, Customer, Money, NewCustomer, Sale};

use super::Shop;
use crate::error::ApiResult;
use crate::state::StateAction;

impl Shop {
    pub async fn create_customer(&self, form: NewCustomer) -> ApiResult<Customer> {
        debug!(name = %form.name, "create_customer");
        validate_customer(&form)?;

        let customer = self.db.customers().create(form).await?;
        self.apply(StateAction::CustomerSaved(customer.clone())).await;
        Ok(customer)
    }

    pub async fn update_customer(&self, customer: Customer) -> ApiResult<Customer> {
        debug!(id = %customer.id, "update_customer");
        validate_customer(&NewCustomer {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            notes: customer.notes.clone(),
        })?;

        let customer = self.db.customers().update(customer).await?;
        self.apply(StateAction::CustomerSaved(customer.clone())).await;
        Ok(customer)
    }

    /// Removes the customer. Their sales stay, keeping the name snapshot.
    pub async fn delete_customer(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "delete_customer");
        self.db.customers().delete(id).await?;
        self.apply(StateAction::CustomerDeleted(id.to_string())).await;
        Ok(())
    }

    pub async fn find_customers_by_phone(&self, phone: &str) -> ApiResult<Vec<Customer>> {
        Ok(self.db.customers().find_by_phone(phone).await?)
    }

    /// The customer's sales with money still owed.
    pub async fn customer_pending_sales(&self, customer_id: &str) -> ApiResult<Vec<Sale>> {
        Ok(self.db.customers().pending_sales(customer_id).await?)
    }

    /// What the customer still owes across all sales.
    pub async fn customer_balance(&self, customer_id: &str) -> Money {
        ledger::customer_pending(self.state().await.sales(), customer_id)
    }
}
