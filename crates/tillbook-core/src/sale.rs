//! # Sale/Payment Engine
//!
//! Builds sales from picked items and payment input, checks stock at commit
//! time, and moves a sale through its settlement states as payments land.
//! This module is the single place where sale state changes; every screen
//! that shows a sale calls into it.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. DRAFT (SaleDraft)                                                   │
//! │     select_customer → add_item / remove_item / set_discount             │
//! │     total() recomputed on every read: max(0, Σ subtotal − discount)     │
//! │                                                                         │
//! │  2. FINALIZE (validate + initial payment state)                         │
//! │     PaymentTerms::Full     → paid, remaining 0, payment_date = now      │
//! │     PaymentTerms::Deferred → unpaid, remaining = total (total > 0)      │
//! │                                                                         │
//! │  3. COMMIT (tillbook-db, one transaction)                               │
//! │     insert sale + Product::take_stock for every item                    │
//! │                                                                         │
//! │  4. SETTLE (Sale::record_payment, repeated)                             │
//! │     PENDING ──► PARTIAL ──► PAID                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{
    line_subtotal, Customer, NewSale, PartialPayment, PaymentMethod, Product, Sale, SaleItem,
    SaleStatus,
};
use crate::validation::{validate_non_negative, validate_quantity, ValidationResult};

// =============================================================================
// Lookups
// =============================================================================

/// Product lookup-by-id used for price snapshots and stock checks.
pub trait ProductLookup {
    fn product(&self, id: &str) -> Option<&Product>;
}

/// Customer lookup-by-id used for name snapshots.
pub trait CustomerLookup {
    fn customer(&self, id: &str) -> Option<&Customer>;
}

impl ProductLookup for [Product] {
    fn product(&self, id: &str) -> Option<&Product> {
        self.iter().find(|p| p.id == id)
    }
}

impl ProductLookup for Vec<Product> {
    fn product(&self, id: &str) -> Option<&Product> {
        self.as_slice().product(id)
    }
}

impl CustomerLookup for [Customer] {
    fn customer(&self, id: &str) -> Option<&Customer> {
        self.iter().find(|c| c.id == id)
    }
}

impl CustomerLookup for Vec<Customer> {
    fn customer(&self, id: &str) -> Option<&Customer> {
        self.as_slice().customer(id)
    }
}

// =============================================================================
// Payment Terms
// =============================================================================

/// How the customer pays at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentTerms {
    /// Everything paid now.
    Full { method: PaymentMethod },
    /// Nothing paid now; installments follow.
    Deferred,
}

impl PaymentTerms {
    /// Full payment with a method typed or picked in the UI.
    ///
    /// An empty method is a `Required` error on `payment_method`.
    pub fn full(method: &str) -> ValidationResult<Self> {
        Ok(PaymentTerms::Full {
            method: method.parse()?,
        })
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// A sale being assembled at the counter.
///
/// ## Invariants
/// - at most one item per product (adding again merges quantities)
/// - merged quantities never exceed the product's stock at the time of adding
/// - credit-only drafts hold no items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleDraft {
    customer_id: Option<String>,
    customer_name: Option<String>,
    items: Vec<SaleItem>,
    discount: Money,
    is_credit_only: bool,
    credit_amount: Money,
    notes: Option<String>,
}

impl SaleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft for a tab with no items.
    pub fn credit_only() -> Self {
        SaleDraft {
            is_credit_only: true,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn is_credit_only(&self) -> bool {
        self.is_credit_only
    }

    /// Picks the customer and snapshots their name.
    pub fn select_customer<L>(&mut self, customers: &L, customer_id: &str) -> CoreResult<()>
    where
        L: CustomerLookup + ?Sized,
    {
        let customer = customers
            .customer(customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        self.customer_id = Some(customer.id.clone());
        self.customer_name = Some(customer.name.clone());
        Ok(())
    }

    /// Adds `quantity` units of a product, merging with an existing line.
    ///
    /// On any error the item list is left untouched.
    ///
    /// ```text
    /// stock 5, line holds 3, add 3  →  InsufficientStock { available: 2, requested: 3 }
    /// stock 5, line holds 3, add 2  →  line holds 5
    /// ```
    pub fn add_item<L>(&mut self, products: &L, product_id: &str, quantity: i64) -> CoreResult<()>
    where
        L: ProductLookup + ?Sized,
    {
        validate_quantity(quantity)?;

        if self.is_credit_only {
            return Err(CoreError::CreditOnlyItems);
        }

        let product = products
            .product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let existing = self.items.iter().position(|i| i.product_id == product.id);
        let reserved = existing.map_or(0, |index| self.items[index].quantity);

        let merged = reserved
            .checked_add(quantity)
            .filter(|merged| *merged <= product.quantity)
            .ok_or_else(|| CoreError::InsufficientStock {
                product: product.name.clone(),
                available: (product.quantity - reserved).max(0),
                requested: quantity,
            })?;

        let line = match existing {
            Some(index) => {
                let item = &self.items[index];
                SaleItem {
                    quantity: merged,
                    subtotal_cents: line_subtotal(item.unit_price(), merged)?.cents(),
                    ..item.clone()
                }
            }
            None => SaleItem::new(product, merged)?,
        };
        let others = self
            .items
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != existing)
            .try_fold(Money::zero(), |acc, (_, item)| acc.checked_add(item.subtotal()));
        if others.and_then(|sum| sum.checked_add(line.subtotal())).is_none() {
            return Err(CoreError::AmountOutOfRange {
                field: "subtotal".to_string(),
            });
        }

        match existing {
            Some(index) => self.items[index] = line,
            None => self.items.push(line),
        }
        Ok(())
    }

    /// Removes the line at `index`.
    pub fn remove_item(&mut self, index: usize) -> CoreResult<SaleItem> {
        if index >= self.items.len() {
            return Err(CoreError::ItemIndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Sets the discount. Larger than the subtotal is allowed; the total
    /// clamps at zero.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        validate_non_negative("discount", discount.cents())?;
        self.discount = discount;
        Ok(())
    }

    /// Switches between an item sale and a credit-only tab. Switching to
    /// credit-only drops any picked items and the discount.
    pub fn set_credit_only(&mut self, credit_only: bool) {
        if credit_only {
            self.items.clear();
            self.discount = Money::zero();
        } else {
            self.credit_amount = Money::zero();
        }
        self.is_credit_only = credit_only;
    }

    /// Amount owed on a credit-only tab.
    pub fn set_credit_amount(&mut self, amount: Money) {
        self.credit_amount = amount;
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes.filter(|n| !n.trim().is_empty());
    }

    /// Σ line subtotals before discount.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(SaleItem::subtotal).sum()
    }

    /// Grand total.
    ///
    /// Item sales: `max(0, Σ subtotal − discount)`. Credit-only: the entered
    /// credit amount.
    pub fn total(&self) -> Money {
        if self.is_credit_only {
            self.credit_amount
        } else {
            (self.subtotal() - self.discount).clamp_non_negative()
        }
    }

    /// Checks the draft can be committed.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.customer_id.is_none() {
            errors.push(ValidationError::required("customer"));
        }

        if self.is_credit_only {
            if !self.credit_amount.is_positive() {
                errors.push(ValidationError::must_be_positive("amount"));
            }
        } else if self.items.is_empty() {
            errors.push(ValidationError::required("items"));
        }

        errors.into_result()
    }

    /// Validates and produces the sale to commit, with its initial payment
    /// state.
    ///
    /// A sale whose total is zero (discount covers everything) has nothing to
    /// defer, so it must be closed with `PaymentTerms::Full`; `Deferred` is a
    /// `Required` error on `payment_method`.
    pub fn finalize(&self, terms: PaymentTerms, now: DateTime<Utc>) -> CoreResult<NewSale> {
        self.validate()?;

        let (customer_id, customer_name) = match (&self.customer_id, &self.customer_name) {
            (Some(id), Some(name)) => (id.clone(), name.clone()),
            _ => return Err(ValidationError::required("customer").into()),
        };

        let total = self.total();
        let items = if self.is_credit_only {
            Vec::new()
        } else {
            self.items.clone()
        };

        let (paid, payment_method, payment_date, remaining) = match terms {
            PaymentTerms::Full { method } => (true, Some(method), Some(now), Money::zero()),
            PaymentTerms::Deferred if total.is_zero() => {
                return Err(ValidationError::required("payment_method").into())
            }
            PaymentTerms::Deferred => (false, None, None, total),
        };

        Ok(NewSale {
            customer_id,
            customer_name,
            items,
            discount_cents: if self.is_credit_only { 0 } else { self.discount.cents() },
            total_cents: total.cents(),
            paid,
            payment_method,
            notes: self.notes.clone(),
            payment_date,
            remaining_cents: remaining.cents(),
            partial_payments: Vec::new(),
            is_credit_only: self.is_credit_only,
        })
    }
}

// =============================================================================
// Commit-time Stock Check
// =============================================================================

impl Product {
    /// Removes `quantity` units from stock, refusing to oversell.
    pub fn take_stock(&mut self, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        if quantity > self.quantity {
            return Err(CoreError::InsufficientStock {
                product: self.name.clone(),
                available: self.quantity,
                requested: quantity,
            });
        }
        self.quantity -= quantity;
        Ok(())
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// Result of recording one payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentOutcome {
    /// Part of the tendered amount that went to the balance.
    pub applied: Money,
    /// Tendered amount beyond the balance, owed back to the customer.
    pub change: Money,
    /// Balance after this payment.
    pub remaining: Money,
    pub status: SaleStatus,
}

impl Sale {
    /// Current settlement state.
    pub fn status(&self) -> SaleStatus {
        if self.remaining_cents <= 0 {
            SaleStatus::Paid
        } else if self.remaining_cents < self.total_cents {
            SaleStatus::Partial
        } else {
            SaleStatus::Pending
        }
    }

    /// Not paid, or a balance is still owed.
    pub fn is_pending(&self) -> bool {
        !self.paid || self.remaining_cents > 0
    }

    /// Money received so far.
    pub fn amount_received(&self) -> Money {
        if self.paid {
            self.total()
        } else {
            self.total().saturating_sub(self.remaining()).clamp_non_negative()
        }
    }

    /// Records one installment.
    ///
    /// ## Rules
    /// - only while something remains to pay
    /// - `amount` must be positive
    /// - amounts above the balance are capped at the balance; the excess is
    ///   reported as change and never stored
    /// - `payment_method` becomes the method of this payment
    ///
    /// On error the sale is unchanged.
    pub fn record_payment(
        &mut self,
        amount: Money,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> CoreResult<PaymentOutcome> {
        if self.remaining_cents <= 0 {
            return Err(CoreError::SaleAlreadySettled {
                sale_id: self.id.clone(),
            });
        }
        if !amount.is_positive() {
            return Err(ValidationError::must_be_positive("amount").into());
        }

        let remaining = self.remaining();
        let applied = amount.min(remaining);
        let change = amount - applied;
        let new_remaining = (remaining - applied).clamp_non_negative();

        self.partial_payments.push(PartialPayment {
            amount_cents: applied.cents(),
            date: now,
            method,
        });
        self.remaining_cents = new_remaining.cents();
        self.payment_method = Some(method);

        if new_remaining.is_zero() {
            self.paid = true;
            self.payment_date = Some(now);
        } else {
            self.paid = false;
        }

        Ok(PaymentOutcome {
            applied,
            change,
            remaining: new_remaining,
            status: self.status(),
        })
    }

    /// True when the settlement fields agree with each other.
    ///
    /// `paid` matches a zero balance and comes with a payment method, the
    /// balance is within `[0, total]`, and installments plus balance add up
    /// to the total whenever installments were recorded.
    pub fn is_settlement_consistent(&self) -> bool {
        let flags_agree = self.paid == (self.remaining_cents == 0);
        let method_known = !self.paid || self.payment_method.is_some();
        let in_range = self.remaining_cents >= 0 && self.remaining_cents <= self.total_cents;
        let installments_agree = self.partial_payments.is_empty()
            || self.installments_total().checked_add(self.remaining()) == Some(self.total());
        flags_agree && method_known && in_range && installments_agree
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductCategory;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn product(id: &str, price_cents: i64, quantity: i64) -> Product {
        let now = now();
        Product {
            id: id.to_string(),
            name: format!("Produto {id}"),
            description: "teste".to_string(),
            price_cents,
            cost_cents: price_cents / 2,
            quantity,
            category: ProductCategory::Accessories,
            min_stock: 5,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn customers() -> Vec<Customer> {
        let now = now();
        vec![Customer {
            id: "c-1".to_string(),
            name: "Bruna".to_string(),
            phone: "(11) 98888-7777".to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
        }]
    }

    fn draft_with_customer() -> SaleDraft {
        let mut draft = SaleDraft::new();
        draft.select_customer(&customers(), "c-1").unwrap();
        draft
    }

    fn deferred_sale(total_cents: i64) -> Sale {
        let mut draft = SaleDraft::credit_only();
        draft.select_customer(&customers(), "c-1").unwrap();
        draft.set_credit_amount(Money::from_cents(total_cents));
        draft
            .finalize(PaymentTerms::Deferred, now())
            .unwrap()
            .into_sale("s-1".to_string(), now())
    }

    // -------------------------------------------------------------------------
    // Drafting
    // -------------------------------------------------------------------------

    #[test]
    fn test_total_is_subtotal_minus_discount() {
        let products = vec![product("p-1", 1990, 10), product("p-2", 5000, 10)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 3).unwrap();
        draft.add_item(&products, "p-2", 1).unwrap();
        draft.set_discount(Money::from_cents(970)).unwrap();

        assert_eq!(draft.subtotal().cents(), 10970);
        assert_eq!(draft.total().cents(), 10000);
    }

    #[test]
    fn test_discount_larger_than_subtotal_clamps_to_zero() {
        let products = vec![product("p-1", 1000, 10)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 1).unwrap();
        draft.set_discount(Money::from_cents(2500)).unwrap();

        assert!(draft.total().is_zero());
    }

    #[test]
    fn test_negative_discount_rejected() {
        let mut draft = draft_with_customer();
        assert!(draft.set_discount(Money::from_cents(-1)).is_err());
        assert!(draft.discount().is_zero());
    }

    #[test]
    fn test_oversell_rejected_without_mutation() {
        let products = vec![product("p-1", 1000, 3)];
        let mut draft = draft_with_customer();

        let err = draft.add_item(&products, "p-1", 5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 3,
                requested: 5,
                ..
            }
        ));
        assert!(draft.items().is_empty());
    }

    #[test]
    fn test_merge_reports_units_still_available() {
        let products = vec![product("p-1", 1000, 5)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 3).unwrap();

        let err = draft.add_item(&products, "p-1", 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 2, .. }
        ));
        assert_eq!(draft.items()[0].quantity, 3);

        draft.add_item(&products, "p-1", 2).unwrap();
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.items()[0].quantity, 5);
        assert_eq!(draft.items()[0].subtotal_cents, 5000);
    }

    #[test]
    fn test_add_item_rejects_bad_input() {
        let products = vec![product("p-1", 1000, 5)];
        let mut draft = draft_with_customer();

        assert!(matches!(
            draft.add_item(&products, "p-1", 0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            draft.add_item(&products, "missing", 1),
            Err(CoreError::ProductNotFound(_))
        ));
        assert!(draft.items().is_empty());
    }

    #[test]
    fn test_remove_item_by_position() {
        let products = vec![product("p-1", 1000, 5), product("p-2", 2000, 5)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 1).unwrap();
        draft.add_item(&products, "p-2", 1).unwrap();

        let removed = draft.remove_item(0).unwrap();
        assert_eq!(removed.product_id, "p-1");
        assert_eq!(draft.total().cents(), 2000);
        assert!(matches!(
            draft.remove_item(4),
            Err(CoreError::ItemIndexOutOfRange { index: 4, len: 1 })
        ));
    }

    #[test]
    fn test_unknown_customer() {
        let mut draft = SaleDraft::new();
        assert!(matches!(
            draft.select_customer(&customers(), "nobody"),
            Err(CoreError::CustomerNotFound(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Finalize
    // -------------------------------------------------------------------------

    #[test]
    fn test_validation_lists_missing_customer_and_items() {
        let draft = SaleDraft::new();
        let err = draft.finalize(PaymentTerms::Deferred, now()).unwrap_err();
        match err {
            CoreError::InvalidForm(errors) => {
                assert!(errors.for_field("customer").is_some());
                assert!(errors.for_field("items").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_credit_only_requires_positive_amount() {
        let mut draft = SaleDraft::credit_only();
        draft.select_customer(&customers(), "c-1").unwrap();

        let err = draft.validate().unwrap_err();
        assert_eq!(
            err.for_field("amount"),
            Some(&ValidationError::must_be_positive("amount"))
        );
    }

    #[test]
    fn test_full_payment_needs_a_method() {
        assert_eq!(
            PaymentTerms::full("").unwrap_err(),
            ValidationError::required("payment_method")
        );
        assert_eq!(
            PaymentTerms::full("PIX").unwrap(),
            PaymentTerms::Full {
                method: PaymentMethod::Pix
            }
        );
    }

    #[test]
    fn test_full_payment_initial_state() {
        let products = vec![product("p-1", 10000, 10)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 1).unwrap();
        let at = now();

        let sale = draft
            .finalize(PaymentTerms::Full { method: PaymentMethod::Cash }, at)
            .unwrap();

        assert!(sale.paid);
        assert_eq!(sale.total_cents, 10000);
        assert_eq!(sale.remaining_cents, 0);
        assert_eq!(sale.payment_date, Some(at));
        assert!(sale.partial_payments.is_empty());
        assert_eq!(sale.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(sale.customer_name, "Bruna");
    }

    #[test]
    fn test_deferred_initial_state() {
        let sale = deferred_sale(10000);
        assert!(!sale.paid);
        assert_eq!(sale.remaining_cents, 10000);
        assert_eq!(sale.payment_date, None);
        assert_eq!(sale.status(), SaleStatus::Pending);
        assert!(sale.is_settlement_consistent());
    }

    #[test]
    fn test_credit_only_sale_has_no_items() {
        let products = vec![product("p-1", 1000, 5)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 2).unwrap();
        draft.set_credit_only(true);
        draft.set_credit_amount(Money::from_cents(25000));

        assert!(matches!(
            draft.add_item(&products, "p-1", 1),
            Err(CoreError::CreditOnlyItems)
        ));

        let sale = draft.finalize(PaymentTerms::Deferred, now()).unwrap();
        assert!(sale.is_credit_only);
        assert!(sale.items.is_empty());
        assert_eq!(sale.total_cents, 25000);
        assert_eq!(sale.remaining_cents, 25000);
    }

    #[test]
    fn test_zero_total_sale_must_be_closed_with_a_method() {
        let products = vec![product("p-1", 1000, 5)];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 1).unwrap();
        draft.set_discount(Money::from_cents(1000)).unwrap();

        let err = draft.finalize(PaymentTerms::Deferred, now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { ref field })
                if field == "payment_method"
        ));

        let sale = draft
            .finalize(PaymentTerms::Full { method: PaymentMethod::Cash }, now())
            .unwrap()
            .into_sale("s-0".to_string(), now());
        assert!(sale.paid);
        assert_eq!(sale.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(sale.remaining_cents, 0);
        assert!(sale.is_settlement_consistent());
    }

    #[test]
    fn test_paid_sale_without_method_is_inconsistent() {
        let mut sale = deferred_sale(5000);
        sale.record_payment(Money::from_cents(5000), PaymentMethod::Pix, now())
            .unwrap();
        assert!(sale.is_settlement_consistent());

        sale.payment_method = None;
        assert!(!sale.is_settlement_consistent());
    }

    #[test]
    fn test_line_subtotal_overflow_rejected() {
        let products = vec![product("p-1", i64::MAX / 2, 10)];
        let mut draft = draft_with_customer();

        let err = draft.add_item(&products, "p-1", 3).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
        assert!(draft.items().is_empty());

        draft.add_item(&products, "p-1", 2).unwrap();
        let err = draft.add_item(&products, "p-1", 1).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
        assert_eq!(draft.items()[0].quantity, 2);
    }

    #[test]
    fn test_draft_subtotal_overflow_rejected() {
        let products = vec![
            product("p-1", i64::MAX / 2 + 1, 1),
            product("p-2", i64::MAX / 2 + 1, 1),
        ];
        let mut draft = draft_with_customer();
        draft.add_item(&products, "p-1", 1).unwrap();

        let err = draft.add_item(&products, "p-2", 1).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
        assert_eq!(draft.items().len(), 1);
    }

    // -------------------------------------------------------------------------
    // Settlement
    // -------------------------------------------------------------------------

    #[test]
    fn test_partial_then_final_payment() {
        let mut sale = deferred_sale(10000);

        let first = sale
            .record_payment(Money::from_cents(4000), PaymentMethod::Pix, now())
            .unwrap();
        assert_eq!(first.remaining.cents(), 6000);
        assert_eq!(first.status, SaleStatus::Partial);
        assert!(!sale.paid);
        assert_eq!(sale.partial_payments.len(), 1);
        assert_eq!(sale.payment_date, None);

        let at = now();
        let second = sale
            .record_payment(Money::from_cents(6000), PaymentMethod::Cash, at)
            .unwrap();
        assert_eq!(second.status, SaleStatus::Paid);
        assert_eq!(sale.remaining_cents, 0);
        assert!(sale.paid);
        assert_eq!(sale.payment_date, Some(at));
        assert_eq!(sale.partial_payments.len(), 2);
        assert_eq!(sale.payment_method, Some(PaymentMethod::Cash));
        assert!(sale.is_settlement_consistent());
    }

    #[test]
    fn test_remaining_strictly_decreases() {
        let mut sale = deferred_sale(1000);
        let mut last = sale.remaining_cents;
        for _ in 0..4 {
            sale.record_payment(Money::from_cents(300), PaymentMethod::Pix, now())
                .unwrap();
            assert!(sale.remaining_cents < last);
            assert!(sale.remaining_cents >= 0);
            last = sale.remaining_cents;
        }
        assert!(sale.paid);
        assert!(sale.is_settlement_consistent());
    }

    #[test]
    fn test_overpayment_capped_and_change_returned() {
        let mut sale = deferred_sale(5000);
        let outcome = sale
            .record_payment(Money::from_cents(7000), PaymentMethod::Cash, now())
            .unwrap();

        assert_eq!(outcome.applied.cents(), 5000);
        assert_eq!(outcome.change.cents(), 2000);
        assert_eq!(sale.partial_payments[0].amount_cents, 5000);
        assert!(sale.is_settlement_consistent());
    }

    #[test]
    fn test_payment_on_settled_sale_rejected() {
        let mut sale = deferred_sale(5000);
        sale.record_payment(Money::from_cents(5000), PaymentMethod::Pix, now())
            .unwrap();

        let before = sale.clone();
        assert!(matches!(
            sale.record_payment(Money::from_cents(1), PaymentMethod::Pix, now()),
            Err(CoreError::SaleAlreadySettled { .. })
        ));
        assert_eq!(sale, before);
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let mut sale = deferred_sale(5000);
        let before = sale.clone();
        assert!(matches!(
            sale.record_payment(Money::zero(), PaymentMethod::Pix, now()),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(sale, before);
    }

    #[test]
    fn test_take_stock() {
        let mut p = product("p-1", 1000, 10);
        p.take_stock(4).unwrap();
        assert_eq!(p.quantity, 6);

        assert!(matches!(
            p.take_stock(7),
            Err(CoreError::InsufficientStock {
                available: 6,
                requested: 7,
                ..
            })
        ));
        assert_eq!(p.quantity, 6);
    }
}
