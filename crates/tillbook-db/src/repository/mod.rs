//! # Repository Module
//!
//! Typed wrappers over the record store, one per entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shop (app)                                                             │
//! │       │                                                                 │
//! │       │  db.sales().create(new_sale)                                    │
//! │       ▼                                                                 │
//! │  SaleRepository                                                         │
//! │  ├── assigns id (UUID v4)                                               │
//! │  ├── stamps created_at / updated_at                                     │
//! │  └── store::create / store::replace / store::query_by_index             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shared Contract
//! - `create` returns the stored record (with its new id and timestamps)
//! - `get` returns `Ok(None)` for an unknown id
//! - `update` stamps `updated_at`, keeps `created_at`, and fails with
//!   `NotFound` for an unknown id
//! - `delete` is idempotent
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - stock and low-stock queries
//! - [`CustomerRepository`](customer::CustomerRepository) - phone lookup, open tabs
//! - [`SaleRepository`](sale::SaleRepository) - sale commit and payments
//! - [`ExpenseRepository`](expense::ExpenseRepository) - date and category queries

pub mod customer;
pub mod expense;
pub mod product;
pub mod sale;

use uuid::Uuid;

/// Fresh record id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
