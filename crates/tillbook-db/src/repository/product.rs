//! # Product Repository
//!
//! ## Key Operations
//! - CRUD over the `products` store
//! - Category lookup through the `by-category` index
//! - Low-stock listing
//! - Manual stock adjustment (restock, count corrections)
//!
//! Sales decrement stock through [`SaleRepository::create`](super::sale::SaleRepository::create),
//! inside the same transaction as the sale insert.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use tillbook_core::{CoreError, NewProduct, Product, ProductCategory};

use super::new_id;
use crate::error::{DbError, DbResult};
use crate::store::{self, Index, KeyRange, StoreName};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Stores a new product with a fresh id and timestamps.
    pub async fn create(&self, form: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = form.into_product(new_id(), now, now);

        debug!(id = %product.id, name = %product.name, "Creating product");

        let mut conn = self.pool.acquire().await?;
        store::create(&mut *conn, &product).await?;
        Ok(product)
    }

    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        store::get(&mut *conn, id).await
    }

    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        store::get_all(&mut *conn).await
    }

    /// Writes the full record with a fresh `updated_at`.
    pub async fn update(&self, mut product: Product) -> DbResult<Product> {
        debug!(id = %product.id, "Updating product");

        product.updated_at = Utc::now();

        let mut conn = self.pool.acquire().await?;
        store::replace(&mut *conn, &product).await?;
        Ok(product)
    }

    /// Removes the product. Historical sales keep their name snapshot.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        if store::delete(&mut *conn, StoreName::Products, id).await? {
            info!(id = %id, "Product deleted");
        }
        Ok(())
    }

    pub async fn find_by_category(&self, category: ProductCategory) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        store::query_by_index(
            &mut *conn,
            Index::ProductsByCategory,
            &KeyRange::only(category.key()),
        )
        .await
    }

    /// Products at or below their low-stock threshold.
    ///
    /// `Some(threshold)` applies one threshold to every product; `None`
    /// uses each product's own `min_stock`.
    pub async fn find_low_stock(&self, threshold: Option<i64>) -> DbResult<Vec<Product>> {
        let products = self.get_all().await?;
        let low: Vec<Product> = products
            .into_iter()
            .filter(|p| p.is_low_stock(threshold))
            .collect();

        debug!(count = low.len(), ?threshold, "Low-stock products");
        Ok(low)
    }

    /// Adds `delta` units (negative to remove). Stock never goes below zero.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let mut product: Product = store::get(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let quantity = product.quantity + delta;
        if quantity < 0 {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: -delta,
            }
            .into());
        }

        product.quantity = quantity;
        product.updated_at = Utc::now();
        store::replace(&mut *tx, &product).await?;
        tx.commit().await?;

        Ok(product)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        store::count(&mut *conn, StoreName::Products).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn form(name: &str, category: ProductCategory, quantity: i64, min_stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "Produto de teste".to_string(),
            price_cents: 20000,
            cost_cents: 12000,
            quantity,
            category,
            min_stock,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let db = setup().await;
        let repo = db.products();

        let product = repo
            .create(form("Truck Crail 139", ProductCategory::Trucks, 4, 2))
            .await
            .unwrap();

        assert!(!product.id.is_empty());
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(repo.get(&product.id).await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn test_update_restamps_updated_at_only() {
        let db = setup().await;
        let repo = db.products();

        let mut product = repo
            .create(form("Truck Crail 139", ProductCategory::Trucks, 4, 2))
            .await
            .unwrap();
        let created_at = product.created_at;
        product.price_cents = 21000;

        let updated = repo.update(product).await.unwrap();
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);
        assert_eq!(repo.get(&updated.id).await.unwrap().unwrap().price_cents, 21000);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let db = setup().await;
        let repo = db.products();
        let product = repo
            .create(form("Lixa Mob", ProductCategory::GripTape, 10, 5))
            .await
            .unwrap();

        repo.delete(&product.id).await.unwrap();
        repo.delete(&product.id).await.unwrap();
        assert!(repo.get(&product.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_category() {
        let db = setup().await;
        let repo = db.products();
        repo.create(form("Roda Bones 52", ProductCategory::Wheels, 8, 5))
            .await
            .unwrap();
        repo.create(form("Roda Spitfire 54", ProductCategory::Wheels, 8, 5))
            .await
            .unwrap();
        repo.create(form("Boné", ProductCategory::Apparel, 8, 5))
            .await
            .unwrap();

        let wheels = repo.find_by_category(ProductCategory::Wheels).await.unwrap();
        assert_eq!(wheels.len(), 2);
        assert!(wheels.iter().all(|p| p.category == ProductCategory::Wheels));
    }

    #[tokio::test]
    async fn test_find_low_stock() {
        let db = setup().await;
        let repo = db.products();
        repo.create(form("Parafuso de base", ProductCategory::Hardware, 3, 5))
            .await
            .unwrap();
        repo.create(form("Chave T", ProductCategory::Tools, 9, 10))
            .await
            .unwrap();
        repo.create(form("Tênis Vans", ProductCategory::Shoes, 30, 5))
            .await
            .unwrap();

        assert_eq!(repo.find_low_stock(None).await.unwrap().len(), 2);
        assert_eq!(repo.find_low_stock(Some(3)).await.unwrap().len(), 1);
        assert_eq!(repo.find_low_stock(Some(100)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = setup().await;
        let repo = db.products();
        let product = repo
            .create(form("Rolamento Reds", ProductCategory::Bearings, 2, 5))
            .await
            .unwrap();

        let restocked = repo.adjust_stock(&product.id, 10).await.unwrap();
        assert_eq!(restocked.quantity, 12);

        let err = repo.adjust_stock(&product.id, -13).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 12, .. })
        ));
        assert_eq!(repo.get(&product.id).await.unwrap().unwrap().quantity, 12);

        assert!(matches!(
            repo.adjust_stock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
