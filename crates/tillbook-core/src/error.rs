//! # Error Types
//!
//! Domain-specific error types for tillbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillbook-core errors (this file)                                       │
//! │  ├── CoreError         - Business rule violations                       │
//! │  ├── ValidationError   - One field failed one rule                      │
//! │  └── ValidationErrors  - Every failing field of a form                  │
//! │                                                                         │
//! │  tillbook-db errors (separate crate)                                    │
//! │  └── DbError           - Store operation failures                       │
//! │                                                                         │
//! │  App errors                                                             │
//! │  └── ApiError          - What the UI sees (code + field messages)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer id does not resolve.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Sale id does not resolve.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Not enough units on hand.
    ///
    /// `available` is what can still be added, i.e. stock minus what the
    /// draft already reserves for the same product.
    ///
    /// ```text
    /// Stock: 3, draft already holds 2
    ///      │
    ///      ▼
    /// add_item(qty: 2)
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Shape Element 8.0", available: 1, requested: 2 }
    /// ```
    #[error("Insufficient stock for {product}: only {available} units available, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Payment recorded against a sale with nothing left to pay.
    #[error("Sale {sale_id} is already fully paid")]
    SaleAlreadySettled { sale_id: String },

    /// Items added to a sale that only records money owed.
    #[error("Credit-only sales carry no items")]
    CreditOnlyItems,

    /// A price × quantity or a running total does not fit in `i64` cents.
    #[error("{field} is too large")]
    AmountOutOfRange { field: String },

    /// The sale's `paid` flag, balance, total and installments disagree.
    #[error("Sale {sale_id} has inconsistent settlement fields")]
    InconsistentSettlement { sale_id: String },

    /// Item position outside the draft's item list.
    #[error("No item at position {index} (draft has {len} items)")]
    ItemIndexOutOfRange { index: usize, len: usize },

    /// A single field failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A whole form failed validation.
    #[error("Validation errors: {0}")]
    InvalidForm(#[from] ValidationErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the field it belongs to so the UI can render the
/// message next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be strictly greater than another field.
    #[error("{field} must be greater than {other}")]
    MustExceed { field: String, other: String },

    /// Date lies after the current moment.
    #[error("{field} cannot be in the future")]
    InFuture { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a `Required` error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a `MustBePositive` error.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    /// Name of the field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::MustExceed { field, .. }
            | ValidationError::InFuture { field }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Validation Errors (form level)
// =============================================================================

/// All failing fields of one form submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    /// Records the error of a single-field check, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.0.push(err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// First error recorded for `field`.
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
