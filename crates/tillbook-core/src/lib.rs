//! # tillbook-core: Pure Business Logic for Tillbook
//!
//! Everything that decides *what happens* to a sale, a payment or the cash
//! balance lives here, as plain functions over plain data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   apps/tillbook (Shop)                          │   │
//! │  │    create_sale, record_payment, dashboard, ...                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tillbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌─────────┐ ┌────────┐ │   │
//! │  │   │  types  │ │  money  │ │   sale    │ │ ledger  │ │validate│ │   │
//! │  │   │ Product │ │  Money  │ │ SaleDraft │ │ balance │ │ forms  │ │   │
//! │  │   │  Sale   │ │         │ │ payments  │ │ pending │ │        │ │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └─────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  tillbook-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Customer, Sale, Expense) and tags
//! - [`money`] - Integer money in centavos
//! - [`sale`] - Sale drafting, commit-time stock checks, payment recording
//! - [`ledger`] - Shop-wide figures folded over sales and expenses
//! - [`validation`] - Field and form validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tillbook_core::money::Money;
//!
//! let price = Money::from_cents(15990); // R$ 159,90
//! let line = price * 2;
//! assert_eq!(line.cents(), 31980);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::Money;
pub use sale::{CustomerLookup, PaymentOutcome, PaymentTerms, ProductLookup, SaleDraft};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum-stock threshold used when a product does not set its own.
pub const DEFAULT_MIN_STOCK: i64 = 5;

/// Largest single expense accepted by the expense form (R$ 1.000.000,00).
pub const MAX_EXPENSE_CENTS: i64 = 100_000_000;

/// Shortest accepted expense description.
pub const MIN_EXPENSE_DESCRIPTION_LEN: usize = 5;
