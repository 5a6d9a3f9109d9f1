//! # tillbook-db: Persistent Store for Tillbook
//!
//! SQLite storage for the four record collections, accessed through `sqlx`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillbook Data Flow                               │
//! │                                                                         │
//! │  Shop::create_sale(draft, terms)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   tillbook-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │ Repositories  │    │    store     │    │    │
//! │  │   │   (pool.rs)   │    │               │    │              │    │    │
//! │  │   │               │    │ ProductRepo   │    │ create/get/  │    │    │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │───►│ put/replace/ │    │    │
//! │  │   │ Migrations    │    │ SaleRepo      │    │ delete/index │    │    │
//! │  │   │ Snapshots     │    │ ExpenseRepo   │    │ queries      │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │   SQLite: products / customers / sales / expenses               │    │
//! │  │   (id, payload JSON, index columns)                             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`store`] - Generic record store with secondary indexes
//! - [`repository`] - One repository per entity
//! - [`snapshot`] - JSON export/import of all data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tillbook.db")).await?;
//!
//! let low = db.products().find_low_stock(None).await?;
//! let open = db.sales().find_pending().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use snapshot::{ImportReport, Snapshot};
pub use store::{Index, IndexKey, KeyRange, Record, StoreName};

pub use repository::customer::CustomerRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleCommit, SaleRepository};
