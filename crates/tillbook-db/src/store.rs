//! # Record Store
//!
//! A keyed record store per entity type with typed secondary indexes.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreName      table       index columns (Index)                       │
//! │  ─────────      ─────       ─────────────────────                       │
//! │  Products       products    category     (ProductsByCategory)           │
//! │  Customers      customers   phone        (CustomersByPhone)             │
//! │  Sales          sales       created_at   (SalesByCreatedAt)             │
//! │                             paid         (SalesByPaid)                  │
//! │                             customer_id  (SalesByCustomer)              │
//! │  Expenses       expenses    date         (ExpensesByDate)               │
//! │                             category     (ExpensesByCategory)           │
//! │                                                                         │
//! │  Every row: id TEXT PK │ payload TEXT (JSON entity) │ index columns     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores and indexes are closed enums, so a query can only name an index
//! that exists. Querying an index through a record type of another store is
//! reported as [`DbError::IndexMismatch`].
//!
//! All operations take `&mut SqliteConnection` so they run the same way on
//! a pooled connection or inside a transaction.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Row, Sqlite, SqliteConnection};
use tracing::debug;

use tillbook_core::{Customer, Expense, Product, Sale};

use crate::error::{DbError, DbResult};

// =============================================================================
// Stores and Indexes
// =============================================================================

/// The four record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreName {
    Products,
    Customers,
    Sales,
    Expenses,
}

impl StoreName {
    pub const ALL: [StoreName; 4] = [
        StoreName::Products,
        StoreName::Customers,
        StoreName::Sales,
        StoreName::Expenses,
    ];

    pub const fn table(&self) -> &'static str {
        match self {
            StoreName::Products => "products",
            StoreName::Customers => "customers",
            StoreName::Sales => "sales",
            StoreName::Expenses => "expenses",
        }
    }

    /// Entity name used in not-found errors.
    pub const fn entity(&self) -> &'static str {
        match self {
            StoreName::Products => "Product",
            StoreName::Customers => "Customer",
            StoreName::Sales => "Sale",
            StoreName::Expenses => "Expense",
        }
    }
}

/// Secondary lookup indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    ProductsByCategory,
    CustomersByPhone,
    SalesByCreatedAt,
    SalesByPaid,
    SalesByCustomer,
    ExpensesByDate,
    ExpensesByCategory,
}

impl Index {
    pub const fn store(&self) -> StoreName {
        match self {
            Index::ProductsByCategory => StoreName::Products,
            Index::CustomersByPhone => StoreName::Customers,
            Index::SalesByCreatedAt | Index::SalesByPaid | Index::SalesByCustomer => {
                StoreName::Sales
            }
            Index::ExpensesByDate | Index::ExpensesByCategory => StoreName::Expenses,
        }
    }

    pub const fn column(&self) -> &'static str {
        match self {
            Index::ProductsByCategory | Index::ExpensesByCategory => "category",
            Index::CustomersByPhone => "phone",
            Index::SalesByCreatedAt => "created_at",
            Index::SalesByPaid => "paid",
            Index::SalesByCustomer => "customer_id",
            Index::ExpensesByDate => "date",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Index::ProductsByCategory => "by-category",
            Index::CustomersByPhone => "by-phone",
            Index::SalesByCreatedAt => "by-date",
            Index::SalesByPaid => "by-paid",
            Index::SalesByCustomer => "by-customer",
            Index::ExpensesByDate => "by-date",
            Index::ExpensesByCategory => "by-category",
        }
    }
}

// =============================================================================
// Keys and Ranges
// =============================================================================

/// A value in an index column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    Text(String),
    Flag(bool),
    Time(DateTime<Utc>),
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        IndexKey::Text(value.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(value: String) -> Self {
        IndexKey::Text(value)
    }
}

impl From<bool> for IndexKey {
    fn from(value: bool) -> Self {
        IndexKey::Flag(value)
    }
}

impl From<DateTime<Utc>> for IndexKey {
    fn from(value: DateTime<Utc>) -> Self {
        IndexKey::Time(value)
    }
}

/// Fixed-width UTC text, so string order is time order.
pub(crate) fn time_key(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Which keys an index query matches. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRange {
    Only(IndexKey),
    Bound {
        lower: Option<IndexKey>,
        upper: Option<IndexKey>,
    },
}

impl KeyRange {
    pub fn only(key: impl Into<IndexKey>) -> Self {
        KeyRange::Only(key.into())
    }

    pub fn between(lower: impl Into<IndexKey>, upper: impl Into<IndexKey>) -> Self {
        KeyRange::Bound {
            lower: Some(lower.into()),
            upper: Some(upper.into()),
        }
    }

    pub fn at_least(lower: impl Into<IndexKey>) -> Self {
        KeyRange::Bound {
            lower: Some(lower.into()),
            upper: None,
        }
    }

    pub fn at_most(upper: impl Into<IndexKey>) -> Self {
        KeyRange::Bound {
            lower: None,
            upper: Some(upper.into()),
        }
    }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_key<'q>(query: SqliteQuery<'q>, key: &IndexKey) -> SqliteQuery<'q> {
    match key {
        IndexKey::Text(text) => query.bind(text.clone()),
        IndexKey::Flag(flag) => query.bind(*flag),
        IndexKey::Time(at) => query.bind(time_key(at)),
    }
}

// =============================================================================
// Record
// =============================================================================

/// An entity persisted in one store.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin {
    const STORE: StoreName;

    fn id(&self) -> &str;

    /// Value of every index of [`Self::STORE`], in any order.
    fn index_keys(&self) -> Vec<(Index, IndexKey)>;
}

impl Record for Product {
    const STORE: StoreName = StoreName::Products;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_keys(&self) -> Vec<(Index, IndexKey)> {
        vec![(Index::ProductsByCategory, self.category.key().into())]
    }
}

impl Record for Customer {
    const STORE: StoreName = StoreName::Customers;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_keys(&self) -> Vec<(Index, IndexKey)> {
        vec![(Index::CustomersByPhone, self.phone.clone().into())]
    }
}

impl Record for Sale {
    const STORE: StoreName = StoreName::Sales;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_keys(&self) -> Vec<(Index, IndexKey)> {
        vec![
            (Index::SalesByCreatedAt, self.created_at.into()),
            (Index::SalesByPaid, self.paid.into()),
            (Index::SalesByCustomer, self.customer_id.clone().into()),
        ]
    }
}

impl Record for Expense {
    const STORE: StoreName = StoreName::Expenses;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_keys(&self) -> Vec<(Index, IndexKey)> {
        vec![
            (Index::ExpensesByDate, self.date.into()),
            (Index::ExpensesByCategory, self.category.key().into()),
        ]
    }
}

/// Index keys checked against the record's store.
fn checked_keys<R: Record>(record: &R) -> DbResult<Vec<(Index, IndexKey)>> {
    let keys = record.index_keys();
    if let Some((index, _)) = keys.iter().find(|(index, _)| index.store() != R::STORE) {
        return Err(DbError::IndexMismatch {
            store: R::STORE.table().to_string(),
            index: index.name().to_string(),
        });
    }
    Ok(keys)
}

fn decode<R: Record>(payload: &str) -> DbResult<R> {
    serde_json::from_str(payload)
        .map_err(|e| DbError::CorruptRecord(format!("{}: {}", R::STORE.table(), e)))
}

// =============================================================================
// Operations
// =============================================================================

/// Inserts a new record. An existing id is a `UniqueViolation`.
pub async fn create<R: Record>(conn: &mut SqliteConnection, record: &R) -> DbResult<()> {
    let keys = checked_keys(record)?;
    let payload = serde_json::to_string(record)?;

    let columns: Vec<&str> = keys.iter().map(|(index, _)| index.column()).collect();
    let placeholders = vec!["?"; columns.len() + 2].join(", ");
    let sql = format!(
        "INSERT INTO {} (id, payload{}{}) VALUES ({})",
        R::STORE.table(),
        if columns.is_empty() { "" } else { ", " },
        columns.join(", "),
        placeholders
    );

    debug!(store = R::STORE.table(), id = %record.id(), "Creating record");

    let mut query = sqlx::query(&sql).bind(record.id().to_string()).bind(payload);
    for (_, key) in &keys {
        query = bind_key(query, key);
    }

    query.execute(&mut *conn).await.map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { .. } => {
            DbError::duplicate(format!("{}.id", R::STORE.table()), record.id())
        }
        other => other,
    })?;

    Ok(())
}

/// Fetches one record. Absence is `Ok(None)`.
pub async fn get<R: Record>(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<R>> {
    let sql = format!("SELECT payload FROM {} WHERE id = ?", R::STORE.table());

    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let payload: String = row.try_get("payload")?;
            Ok(Some(decode(&payload)?))
        }
        None => Ok(None),
    }
}

/// Every record of the store, in insertion order.
pub async fn get_all<R: Record>(conn: &mut SqliteConnection) -> DbResult<Vec<R>> {
    let sql = format!("SELECT payload FROM {} ORDER BY rowid", R::STORE.table());

    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

    rows.iter()
        .map(|row| -> DbResult<R> {
            let payload: String = row.try_get("payload")?;
            decode(&payload)
        })
        .collect()
}

/// Insert-or-replace by id.
pub async fn put<R: Record>(conn: &mut SqliteConnection, record: &R) -> DbResult<()> {
    let keys = checked_keys(record)?;
    let payload = serde_json::to_string(record)?;

    let columns: Vec<&str> = keys.iter().map(|(index, _)| index.column()).collect();
    let placeholders = vec!["?"; columns.len() + 2].join(", ");
    let updates: String = std::iter::once("payload")
        .chain(columns.iter().copied())
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} (id, payload{}{}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        R::STORE.table(),
        if columns.is_empty() { "" } else { ", " },
        columns.join(", "),
        placeholders,
        updates
    );

    debug!(store = R::STORE.table(), id = %record.id(), "Putting record");

    let mut query = sqlx::query(&sql).bind(record.id().to_string()).bind(payload);
    for (_, key) in &keys {
        query = bind_key(query, key);
    }
    query.execute(&mut *conn).await?;

    Ok(())
}

/// Overwrites an existing record. A missing id is `NotFound`.
pub async fn replace<R: Record>(conn: &mut SqliteConnection, record: &R) -> DbResult<()> {
    let keys = checked_keys(record)?;
    let payload = serde_json::to_string(record)?;

    let assignments: String = std::iter::once("payload = ?".to_string())
        .chain(keys.iter().map(|(index, _)| format!("{} = ?", index.column())))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?",
        R::STORE.table(),
        assignments
    );

    debug!(store = R::STORE.table(), id = %record.id(), "Replacing record");

    let mut query = sqlx::query(&sql).bind(payload);
    for (_, key) in &keys {
        query = bind_key(query, key);
    }
    let result = query
        .bind(record.id().to_string())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(R::STORE.entity(), record.id()));
    }
    Ok(())
}

/// Removes by id. Returns whether a record was removed; a missing id is
/// not an error.
pub async fn delete(conn: &mut SqliteConnection, store: StoreName, id: &str) -> DbResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", store.table());

    debug!(store = store.table(), id = %id, "Deleting record");

    let result = sqlx::query(&sql)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Records whose `index` value falls in `range`, ordered by that value.
pub async fn query_by_index<R: Record>(
    conn: &mut SqliteConnection,
    index: Index,
    range: &KeyRange,
) -> DbResult<Vec<R>> {
    if index.store() != R::STORE {
        return Err(DbError::IndexMismatch {
            store: R::STORE.table().to_string(),
            index: index.name().to_string(),
        });
    }

    let column = index.column();
    let (condition, keys): (String, Vec<&IndexKey>) = match range {
        KeyRange::Only(key) => (format!("{column} = ?"), vec![key]),
        KeyRange::Bound { lower, upper } => {
            let mut clauses = Vec::new();
            let mut keys = Vec::new();
            if let Some(lower) = lower {
                clauses.push(format!("{column} >= ?"));
                keys.push(lower);
            }
            if let Some(upper) = upper {
                clauses.push(format!("{column} <= ?"));
                keys.push(upper);
            }
            if clauses.is_empty() {
                ("1 = 1".to_string(), keys)
            } else {
                (clauses.join(" AND "), keys)
            }
        }
    };

    let sql = format!(
        "SELECT payload FROM {} WHERE {} ORDER BY {}, rowid",
        R::STORE.table(),
        condition,
        column
    );

    debug!(store = R::STORE.table(), index = index.name(), "Querying index");

    let mut query = sqlx::query(&sql);
    for key in keys {
        query = bind_key(query, key);
    }
    let rows = query.fetch_all(&mut *conn).await?;

    rows.iter()
        .map(|row| -> DbResult<R> {
            let payload: String = row.try_get("payload")?;
            decode(&payload)
        })
        .collect()
}

/// Number of records in a store.
pub async fn count(conn: &mut SqliteConnection, store: StoreName) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", store.table());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
    Ok(count)
}

/// Removes every record of a store.
pub async fn clear(conn: &mut SqliteConnection, store: StoreName) -> DbResult<u64> {
    let sql = format!("DELETE FROM {}", store.table());
    let result = sqlx::query(&sql).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================
