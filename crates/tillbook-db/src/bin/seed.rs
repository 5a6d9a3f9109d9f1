//! # Seed Data Generator
//!
//! Populates a database with a small skate shop for development.
//!
//! ## Usage
//! ```bash
//! # Default database and 30 sales
//! cargo run -p tillbook-db --bin seed
//!
//! # Custom amount of sales
//! cargo run -p tillbook-db --bin seed -- --sales 200
//!
//! # Specify database path
//! cargo run -p tillbook-db --bin seed -- --db ./data/tillbook.db
//! ```
//!
//! ## Generated Data
//! - One product per catalog line, with stock and minimum stock
//! - A handful of customers
//! - Sales spread over the last 60 days: paid, partially paid, on account
//! - Monthly fixed expenses and restock purchases

use chrono::{Duration, Utc};
use std::env;
use tillbook_core::{
    Customer, ExpenseCategory, Money, NewCustomer, NewExpense, NewProduct, PaymentMethod,
    PaymentTerms, Product, ProductCategory, SaleDraft,
};
use tillbook_db::{Database, DbConfig};

/// (category, name, price in cents, stock)
const CATALOG: &[(ProductCategory, &str, i64, i64)] = &[
    (ProductCategory::Decks, "Shape Maple 8.0", 24990, 12),
    (ProductCategory::Decks, "Shape Maple 8.25", 24990, 8),
    (ProductCategory::Decks, "Shape Marfim 8.5", 18990, 4),
    (ProductCategory::Trucks, "Truck Crail 139mm", 32990, 6),
    (ProductCategory::Trucks, "Truck Intruder 149mm", 29990, 3),
    (ProductCategory::Wheels, "Roda Moska 53mm", 13990, 15),
    (ProductCategory::Wheels, "Roda Bones 54mm", 39990, 2),
    (ProductCategory::Bearings, "Rolamento Red Bones", 21990, 9),
    (ProductCategory::Bearings, "Rolamento Abec 7", 4990, 20),
    (ProductCategory::GripTape, "Lixa Jessup", 6990, 25),
    (ProductCategory::GripTape, "Lixa Mob Grip", 7990, 5),
    (ProductCategory::Hardware, "Parafuso de base 1\"", 1490, 40),
    (ProductCategory::Hardware, "Amortecedor Bushings", 3990, 7),
    (ProductCategory::Tools, "Chave T", 4490, 10),
    (ProductCategory::Accessories, "Vela de skate", 990, 30),
    (ProductCategory::Apparel, "Camiseta logo", 8990, 18),
    (ProductCategory::Apparel, "Boné aba curva", 7490, 1),
    (ProductCategory::Shoes, "Tênis Vans Old Skool", 44990, 6),
    (ProductCategory::Other, "Adesivo pack", 1990, 50),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ana Souza", "11988887777"),
    ("Bruno Lima", "11977776666"),
    ("Carla Dias", "21966665555"),
    ("Diego Alves", "31955554444"),
    ("Eduarda Reis", "41944443333"),
];

/// (description, category, amount in cents)
const MONTHLY_EXPENSES: &[(&str, ExpenseCategory, i64)] = &[
    ("Aluguel da loja", ExpenseCategory::Rent, 250000),
    ("Conta de energia", ExpenseCategory::Utilities, 32000),
    ("Internet e telefone", ExpenseCategory::Utilities, 15000),
    ("Impulsionamento Instagram", ExpenseCategory::Marketing, 20000),
];

const METHODS: &[PaymentMethod] = &[
    PaymentMethod::Cash,
    PaymentMethod::Pix,
    PaymentMethod::CreditCard,
    PaymentMethod::DebitCard,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 30;
    let mut db_path = String::from("./tillbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tillbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of sales to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./tillbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tillbook Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    println!();
    println!("Generating products...");
    let mut products: Vec<Product> = Vec::with_capacity(CATALOG.len());
    for (category, name, price_cents, quantity) in CATALOG {
        let product = db
            .products()
            .create(NewProduct {
                name: name.to_string(),
                description: format!("{} - {}", category.label(), name),
                price_cents: *price_cents,
                cost_cents: price_cents * 55 / 100,
                quantity: quantity * 4,
                category: *category,
                min_stock: (*quantity / 3).max(1),
                image_url: None,
            })
            .await?;
        products.push(product);
    }
    println!("  {} products", products.len());

    println!("Generating customers...");
    let mut customers: Vec<Customer> = Vec::with_capacity(CUSTOMERS.len());
    for (name, phone) in CUSTOMERS {
        customers.push(
            db.customers()
                .create(NewCustomer {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    notes: None,
                })
                .await?,
        );
    }
    println!("  {} customers", customers.len());

    println!("Generating sales...");
    let now = Utc::now();
    let mut generated = 0;
    for seed in 0..sales {
        let customer = &customers[seed % customers.len()];
        let created_at = now - Duration::hours((seed as i64 * 47) % (60 * 24));

        let mut draft = if seed % 11 == 10 {
            let mut draft = SaleDraft::credit_only();
            draft.set_credit_amount(Money::from_cents(5000 + (seed as i64 % 7) * 2500));
            draft
        } else {
            let mut draft = SaleDraft::new();
            for line in 0..(1 + seed % 3) {
                let product = &products[(seed * 7 + line * 5) % products.len()];
                // Out-of-stock lines are skipped.
                let _ = draft.add_item(&products, &product.id, 1 + (seed % 2) as i64);
            }
            if seed % 4 == 0 {
                draft.set_discount(Money::from_cents(1000))?;
            }
            draft
        };
        draft.select_customer(&customers, &customer.id)?;

        let terms = if seed % 3 == 0 {
            PaymentTerms::Deferred
        } else {
            PaymentTerms::Full {
                method: METHODS[seed % METHODS.len()],
            }
        };

        let new_sale = match draft.finalize(terms, created_at) {
            Ok(sale) => sale,
            Err(e) => {
                eprintln!("Skipping sale {}: {}", seed, e);
                continue;
            }
        };

        let commit = match db.sales().create_at(new_sale, created_at).await {
            Ok(commit) => commit,
            Err(e) => {
                eprintln!("Failed to commit sale {}: {}", seed, e);
                continue;
            }
        };
        for updated in commit.updated_products {
            if let Some(slot) = products.iter_mut().find(|p| p.id == updated.id) {
                *slot = updated;
            }
        }

        // Some tabs get a first installment.
        if seed % 6 == 0 && commit.sale.remaining_cents > 1 {
            let half = Money::from_cents(commit.sale.remaining_cents / 2);
            db.sales()
                .record_payment(&commit.sale.id, half, PaymentMethod::Pix)
                .await?;
        }

        generated += 1;
    }
    println!("  {} sales", generated);

    println!("Generating expenses...");
    let mut expenses = 0;
    for month in 0..2 {
        for (description, category, amount_cents) in MONTHLY_EXPENSES {
            db.expenses()
                .create(NewExpense {
                    description: description.to_string(),
                    amount_cents: *amount_cents,
                    category: *category,
                    date: now - Duration::days(30 * month + 2),
                    notes: None,
                    payment_method: PaymentMethod::BankTransfer,
                })
                .await?;
            expenses += 1;
        }
    }
    db.expenses()
        .create(NewExpense {
            description: "Reposição de rodas e rolamentos".to_string(),
            amount_cents: 180000,
            category: ExpenseCategory::Restock,
            date: now - Duration::days(20),
            notes: Some("Distribuidora".to_string()),
            payment_method: PaymentMethod::Boleto,
        })
        .await?;
    expenses += 1;
    println!("  {} expenses", expenses);

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded in {:?}", elapsed);

    let pending = db.sales().find_pending().await?;
    let low = db.products().find_low_stock(None).await?;
    println!("  Open sales:        {}", pending.len());
    println!("  Low-stock products: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
