//! # State Module
//!
//! The in-memory mirror of the four collections, and the app configuration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  Shop operation                                                         │
//! │      │                                                                  │
//! │      │  1. repository call (SQLite)                                     │
//! │      ▼                                                                  │
//! │  Ok(record) ──► StateAction::SaleSaved(sale) ──► AppState::apply        │
//! │                                                                         │
//! │  Err(_) ──────► mirror untouched                                        │
//! │                                                                         │
//! │  AppState                                                               │
//! │  ├── products   (store order)                                           │
//! │  ├── customers                                                          │
//! │  ├── sales                                                              │
//! │  └── expenses                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mirror never changes except through [`AppState::apply`], and every
//! action is built from a successful store result, so it always equals the
//! last known store state.

mod config;

pub use config::{AppConfig, ConfigError, DEFAULT_LOG_FILTER};

use serde::Serialize;
use tillbook_core::{Customer, CustomerLookup, Expense, Product, ProductLookup, Sale};

/// A store result to replay into the mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum StateAction {
    /// Full reload from the store.
    Loaded {
        products: Vec<Product>,
        customers: Vec<Customer>,
        sales: Vec<Sale>,
        expenses: Vec<Expense>,
    },
    ProductSaved(Product),
    ProductDeleted(String),
    CustomerSaved(Customer),
    CustomerDeleted(String),
    SaleSaved(Sale),
    SaleDeleted(String),
    ExpenseSaved(Expense),
    ExpenseDeleted(String),
}

/// Last known contents of every store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    products: Vec<Product>,
    customers: Vec<Customer>,
    sales: Vec<Sale>,
    expenses: Vec<Expense>,
}

/// Replaces the record with the same id, or appends it.
fn upsert<T>(records: &mut Vec<T>, record: T, id: impl Fn(&T) -> &str) {
    match records.iter().position(|r| id(r) == id(&record)) {
        Some(pos) => records[pos] = record,
        None => records.push(record),
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: StateAction) {
        match action {
            StateAction::Loaded {
                products,
                customers,
                sales,
                expenses,
            } => {
                self.products = products;
                self.customers = customers;
                self.sales = sales;
                self.expenses = expenses;
            }
            StateAction::ProductSaved(product) => {
                upsert(&mut self.products, product, |p| p.id.as_str())
            }
            StateAction::ProductDeleted(id) => self.products.retain(|p| p.id != id),
            StateAction::CustomerSaved(customer) => {
                upsert(&mut self.customers, customer, |c| c.id.as_str())
            }
            StateAction::CustomerDeleted(id) => self.customers.retain(|c| c.id != id),
            StateAction::SaleSaved(sale) => upsert(&mut self.sales, sale, |s| s.id.as_str()),
            StateAction::SaleDeleted(id) => self.sales.retain(|s| s.id != id),
            StateAction::ExpenseSaved(expense) => {
                upsert(&mut self.expenses, expense, |e| e.id.as_str())
            }
            StateAction::ExpenseDeleted(id) => self.expenses.retain(|e| e.id != id),
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }
}

impl ProductLookup for AppState {
    fn product(&self, id: &str) -> Option<&Product> {
        self.products.product(id)
    }
}

impl CustomerLookup for AppState {
    fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.customer(id)
    }
}
