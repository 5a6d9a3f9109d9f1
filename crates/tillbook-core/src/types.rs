//! # Domain Types
//!
//! The four persisted entities, the value objects embedded in a sale, and
//! the enumerated tags used for categories and payment methods.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Product ◄─────────── SaleItem.product_id (+ product_name snapshot)     │
//! │                                │                                        │
//! │  Customer ◄── Sale.customer_id │ (+ customer_name snapshot)             │
//! │                 │              │                                        │
//! │                 ├── items: Vec<SaleItem> ◄┘  (empty when credit-only)   │
//! │                 └── partial_payments: Vec<PartialPayment>               │
//! │                                                                         │
//! │  Expense (standalone, no links)                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Names are denormalized into sales at write time so historical sales stay
//! readable after the product or customer is edited or deleted.
//!
//! Every entity has a `NewX` counterpart: the caller's input before the
//! repository assigns the id and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::DEFAULT_MIN_STOCK;

// =============================================================================
// Labelled Tags
// =============================================================================

/// Declares a closed set of tags with a stable storage key and a display
/// label. Parsing accepts either, so values typed or picked in the UI and
/// values read back from storage both resolve.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($key:literal, $label:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[serde(rename_all = "snake_case")]
        #[ts(export)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every tag, in display order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// Stable snake_case key used in storage and index columns.
            pub const fn key(&self) -> &'static str {
                match self {
                    $( $name::$variant => $key, )+
                }
            }

            /// Human-readable label shown in the shop UI.
            pub const fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(ValidationError::required($field));
                }
                $name::ALL
                    .iter()
                    .copied()
                    .find(|tag| tag.key() == s || tag.label().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: $name::ALL.iter().map(|t| t.label().to_string()).collect(),
                    })
            }
        }
    };
}

labelled_enum! {
    /// What kind of item a product is.
    ProductCategory, field = "category" {
        Decks => ("decks", "Shapes"),
        Trucks => ("trucks", "Trucks"),
        Wheels => ("wheels", "Rodas"),
        Bearings => ("bearings", "Rolamentos"),
        GripTape => ("grip_tape", "Lixas"),
        Hardware => ("hardware", "Parafusos"),
        Tools => ("tools", "Ferramentas"),
        Accessories => ("accessories", "Acessórios"),
        Apparel => ("apparel", "Roupas"),
        Shoes => ("shoes", "Tênis"),
        Other => ("other", "Outros"),
    }
}

labelled_enum! {
    /// How money changed hands.
    PaymentMethod, field = "payment_method" {
        Cash => ("cash", "Dinheiro"),
        Pix => ("pix", "PIX"),
        CreditCard => ("credit_card", "Cartão de Crédito"),
        DebitCard => ("debit_card", "Cartão de Débito"),
        BankTransfer => ("bank_transfer", "Transferência Bancária"),
        Boleto => ("boleto", "Boleto"),
        Other => ("other", "Outro"),
    }
}

labelled_enum! {
    /// What an expense paid for.
    ExpenseCategory, field = "category" {
        Restock => ("restock", "Reposição de Estoque"),
        Rent => ("rent", "Aluguel"),
        Utilities => ("utilities", "Contas (Água/Luz/Internet)"),
        Payroll => ("payroll", "Salários e Benefícios"),
        Marketing => ("marketing", "Marketing e Publicidade"),
        EquipmentMaintenance => ("equipment_maintenance", "Manutenção de Equipamentos"),
        Shipping => ("shipping", "Frete e Entregas"),
        OfficeSupplies => ("office_supplies", "Materiais de Escritório"),
        TaxesAndFees => ("taxes_and_fees", "Taxas e Impostos"),
        Travel => ("travel", "Viagens e Transportes"),
        Other => ("other", "Outros Gastos"),
    }
}

/// Settlement state of a sale, derived from its remaining balance.
///
/// ```text
///            record_payment (partial)     record_payment (rest)
///  PENDING ───────────────────────► PARTIAL ─────────────────► PAID
///     │                                                         ▲
///     └──────────────── record_payment (all) ───────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SaleStatus {
    /// Nothing received yet.
    Pending,
    /// Some installments received.
    Partial,
    /// Nothing left to pay.
    Paid,
}

// =============================================================================
// Product
// =============================================================================

fn default_min_stock() -> i64 {
    DEFAULT_MIN_STOCK
}

/// A sellable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub description: String,

    /// Unit sale price in centavos.
    pub price_cents: i64,

    /// Unit cost in centavos.
    pub cost_cents: i64,

    /// Units on hand. Never negative.
    pub quantity: i64,

    pub category: ProductCategory,

    /// Low-stock alert threshold.
    #[serde(default = "default_min_stock")]
    pub min_stock: i64,

    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// True when on-hand quantity is at or below the threshold.
    ///
    /// An explicit `threshold` applies to every product; without one the
    /// product's own `min_stock` is used.
    pub fn is_low_stock(&self, threshold: Option<i64>) -> bool {
        self.quantity <= threshold.unwrap_or(self.min_stock)
    }
}

/// Product form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub quantity: i64,
    pub category: ProductCategory,
    #[serde(default = "default_min_stock")]
    pub min_stock: i64,
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Builds the stored record.
    pub fn into_product(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price_cents: self.price_cents,
            cost_cents: self.cost_cents,
            quantity: self.quantity,
            category: self.category,
            min_stock: self.min_stock,
            image_url: self.image_url,
            created_at,
            updated_at,
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Someone who buys, possibly on credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,

    pub name: String,

    /// Stored as typed; formatting is a display concern.
    pub phone: String,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Customer form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Customer {
        Customer {
            id,
            name: self.name.trim().to_string(),
            phone: self.phone,
            notes: self.notes,
            created_at,
            updated_at,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale. Product name and price are snapshots taken when the
/// line was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// `unit_price_cents × quantity`
    pub subtotal_cents: i64,
}

impl SaleItem {
    /// Snapshots `product` for `quantity` units.
    ///
    /// Fails with `AmountOutOfRange` when the subtotal overflows.
    pub fn new(product: &Product, quantity: i64) -> CoreResult<Self> {
        let subtotal = line_subtotal(product.price(), quantity)?;
        Ok(SaleItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price_cents: product.price_cents,
            subtotal_cents: subtotal.cents(),
        })
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

pub(crate) fn line_subtotal(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .multiply_quantity(quantity)
        .ok_or_else(|| CoreError::AmountOutOfRange {
            field: "subtotal".to_string(),
        })
}

/// One installment toward a sale's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartialPayment {
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub method: PaymentMethod,
}

impl PartialPayment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A committed sale.
///
/// ## Invariants
/// - `remaining_cents == 0` exactly when `paid`
/// - item sales: `total_cents == max(0, Σ subtotal − discount)`
/// - `Σ partial_payments + remaining == total` unless the sale was paid in
///   full at creation (which records no installments)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,

    pub customer_id: String,

    /// Snapshot of the customer's name at sale time.
    pub customer_name: String,

    /// Empty for credit-only sales.
    pub items: Vec<SaleItem>,

    pub discount_cents: i64,

    pub total_cents: i64,

    pub paid: bool,

    /// Method of the most recent payment.
    pub payment_method: Option<PaymentMethod>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Set the moment the sale becomes fully paid.
    #[ts(as = "Option<String>")]
    pub payment_date: Option<DateTime<Utc>>,

    /// Unpaid balance.
    pub remaining_cents: i64,

    /// Installments, oldest first. Append-only.
    pub partial_payments: Vec<PartialPayment>,

    /// A tab with no inventory items ("fiado").
    pub is_credit_only: bool,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn remaining(&self) -> Money {
        Money::from_cents(self.remaining_cents)
    }

    /// Σ item subtotals before discount.
    pub fn items_subtotal(&self) -> Money {
        self.items.iter().map(SaleItem::subtotal).sum()
    }

    /// Σ recorded installments.
    pub fn installments_total(&self) -> Money {
        self.partial_payments.iter().map(PartialPayment::amount).sum()
    }
}

/// A sale ready to be committed; produced by [`crate::sale::SaleDraft::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub customer_id: String,
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid: bool,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub payment_date: Option<DateTime<Utc>>,
    pub remaining_cents: i64,
    pub partial_payments: Vec<PartialPayment>,
    pub is_credit_only: bool,
}

impl NewSale {
    /// Builds the stored record. Creation stamps both timestamps with `now`.
    pub fn into_sale(self, id: String, now: DateTime<Utc>) -> Sale {
        Sale {
            id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            items: self.items,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            paid: self.paid,
            payment_method: self.payment_method,
            notes: self.notes,
            created_at: now,
            updated_at: now,
            payment_date: self.payment_date,
            remaining_cents: self.remaining_cents,
            partial_payments: self.partial_payments,
            is_credit_only: self.is_credit_only,
        }
    }
}

// =============================================================================
// Expense
// =============================================================================

/// Money going out of the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: String,

    pub description: String,

    pub amount_cents: i64,

    pub category: ExpenseCategory,

    /// When the expense happened. Never in the future.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    pub notes: Option<String>,

    pub payment_method: PaymentMethod,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Expense form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub description: String,
    pub amount_cents: i64,
    pub category: ExpenseCategory,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl NewExpense {
    pub fn into_expense(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Expense {
        Expense {
            id,
            description: self.description.trim().to_string(),
            amount_cents: self.amount_cents,
            category: self.category,
            date: self.date,
            notes: self.notes,
            payment_method: self.payment_method,
            created_at,
            updated_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, min_stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Roda Spitfire 53mm".to_string(),
            description: "99A".to_string(),
            price_cents: 34990,
            cost_cents: 21000,
            quantity,
            category: ProductCategory::Wheels,
            min_stock,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_method_parses_label_and_key() {
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("Dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("credit_card".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditCard);
    }

    #[test]
    fn test_empty_payment_method_is_required_error() {
        let err = "  ".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err, ValidationError::required("payment_method"));
    }

    #[test]
    fn test_unknown_category_lists_allowed() {
        let err = "Skates".parse::<ProductCategory>().unwrap_err();
        match err {
            ValidationError::NotAllowed { field, allowed } => {
                assert_eq!(field, "category");
                assert_eq!(allowed.len(), ProductCategory::ALL.len());
                assert!(allowed.contains(&"Shapes".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tags_serialize_as_keys() {
        let json = serde_json::to_string(&ExpenseCategory::TaxesAndFees).unwrap();
        assert_eq!(json, "\"taxes_and_fees\"");
        assert_eq!(ExpenseCategory::TaxesAndFees.key(), "taxes_and_fees");
        assert_eq!(ExpenseCategory::TaxesAndFees.to_string(), "Taxas e Impostos");
    }

    #[test]
    fn test_low_stock_rule() {
        assert!(product(5, 5).is_low_stock(None));
        assert!(!product(6, 5).is_low_stock(None));
        assert!(product(2, 1).is_low_stock(Some(3)));
        assert!(!product(4, 10).is_low_stock(Some(3)));
    }

    #[test]
    fn test_sale_item_snapshots_price() {
        let item = SaleItem::new(&product(10, 5), 3).unwrap();
        assert_eq!(item.product_name, "Roda Spitfire 53mm");
        assert_eq!(item.unit_price_cents, 34990);
        assert_eq!(item.subtotal_cents, 104970);
    }

    #[test]
    fn test_sale_item_subtotal_overflow() {
        let mut expensive = product(10, 5);
        expensive.price_cents = i64::MAX / 2;
        assert!(matches!(
            SaleItem::new(&expensive, 3),
            Err(CoreError::AmountOutOfRange { .. })
        ));
        assert!(SaleItem::new(&expensive, 2).is_ok());
    }

    #[test]
    fn test_product_min_stock_defaults_when_missing() {
        let json = r#"{
            "name": "Lixa Jessup",
            "description": "Lixa preta",
            "price_cents": 6000,
            "cost_cents": 3500,
            "quantity": 12,
            "category": "grip_tape",
            "image_url": null
        }"#;
        let form: NewProduct = serde_json::from_str(json).unwrap();
        assert_eq!(form.min_stock, DEFAULT_MIN_STOCK);
    }
}
