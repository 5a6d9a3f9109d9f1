//! # Validation Module
//!
//! Field validators return the first rule a single value breaks; form
//! validators run every field and return all failures at once so the UI can
//! mark each offending input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form submit                                                            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  validate_product / validate_expense / validate_customer                │
//! │      │                                                                  │
//! │      ├── Err(ValidationErrors) ──► form stays editable, nothing stored  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Repository create / update                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillbook_core::validation::{validate_quantity, validate_required};
//!
//! assert!(validate_required("name", "Truck Crail").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::{ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{NewCustomer, NewExpense, NewProduct};
use crate::{MAX_EXPENSE_CENTS, MIN_EXPENSE_DESCRIPTION_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects empty or whitespace-only text.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Required, and at least `min` characters once trimmed.
pub fn validate_min_len(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    validate_required(field, value)?;
    if value.trim().chars().count() < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    Ok(())
}

/// Amount strictly greater than zero.
pub fn validate_positive(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

/// Amount or count that may be zero but not below.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Item quantity: strictly positive.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }
    Ok(())
}

/// Date at or before `now`.
pub fn validate_not_future(
    field: &str,
    date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ValidationResult<()> {
    if date > now {
        return Err(ValidationError::InFuture {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Product form.
///
/// ## Rules
/// - name and description required
/// - price > 0, cost ≥ 0, price > cost
/// - quantity ≥ 0, min_stock ≥ 0
pub fn validate_product(form: &NewProduct) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_required("name", &form.name));
    errors.check(validate_required("description", &form.description));

    let price = Money::from_cents(form.price_cents);
    match validate_positive("price", price) {
        Err(e) => errors.push(e),
        Ok(()) if form.price_cents <= form.cost_cents => errors.push(ValidationError::MustExceed {
            field: "price".to_string(),
            other: "cost".to_string(),
        }),
        Ok(()) => {}
    }

    errors.check(validate_non_negative("cost", form.cost_cents));
    errors.check(validate_non_negative("quantity", form.quantity));
    errors.check(validate_non_negative("min_stock", form.min_stock));

    errors.into_result()
}

/// Customer form: name and phone required.
pub fn validate_customer(form: &NewCustomer) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_required("name", &form.name));
    errors.check(validate_required("phone", &form.phone));
    errors.into_result()
}

/// Expense form.
///
/// ## Rules
/// - description required, at least 5 characters
/// - 0 < amount ≤ R$ 1.000.000,00
/// - date not after `now`
pub fn validate_expense(form: &NewExpense, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_min_len(
        "description",
        &form.description,
        MIN_EXPENSE_DESCRIPTION_LEN,
    ));

    let amount = Money::from_cents(form.amount_cents);
    match validate_positive("amount", amount) {
        Err(e) => errors.push(e),
        Ok(()) if form.amount_cents > MAX_EXPENSE_CENTS => errors.push(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: MAX_EXPENSE_CENTS,
        }),
        Ok(()) => {}
    }

    errors.check(validate_not_future("date", form.date, now));

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================
