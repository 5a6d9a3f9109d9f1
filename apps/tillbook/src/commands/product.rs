//! # Product Operations

use tracing::debug;

use tillbook_core::validation::validate_product;
use tillbook_core::{ledger, NewProduct, Product, ProductCategory};

use super::Shop;
use crate::error::ApiResult;
use crate::state::StateAction;

/// The editable fields of a stored product, for re-validation.
fn as_form(product: &Product) -> NewProduct {
    NewProduct {
        name: product.name.clone(),
        description: product.description.clone(),
        price_cents: product.price_cents,
        cost_cents: product.cost_cents,
        quantity: product.quantity,
        category: product.category,
        min_stock: product.min_stock,
        image_url: product.image_url.clone(),
    }
}

impl Shop {
    pub async fn create_product(&self, form: NewProduct) -> ApiResult<Product> {
        debug!(name = %form.name, "create_product");
        validate_product(&form)?;

        let product = self.db.products().create(form).await?;
        self.apply(StateAction::ProductSaved(product.clone())).await;
        Ok(product)
    }

    pub async fn update_product(&self, product: Product) -> ApiResult<Product> {
        debug!(id = %product.id, "update_product");
        validate_product(&as_form(&product))?;

        let product = self.db.products().update(product).await?;
        self.apply(StateAction::ProductSaved(product.clone())).await;
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "delete_product");
        self.db.products().delete(id).await?;
        self.apply(StateAction::ProductDeleted(id.to_string())).await;
        Ok(())
    }

    /// Restock (positive) or write off (negative) units.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> ApiResult<Product> {
        debug!(id = %id, delta = delta, "adjust_stock");
        let product = self.db.products().adjust_stock(id, delta).await?;
        self.apply(StateAction::ProductSaved(product.clone())).await;
        Ok(product)
    }

    pub async fn products_by_category(&self, category: ProductCategory) -> ApiResult<Vec<Product>> {
        Ok(self.db.products().find_by_category(category).await?)
    }

    /// Products at or below the configured threshold (or their own minimum).
    pub async fn low_stock(&self) -> Vec<Product> {
        let state = self.state().await;
        let low: Vec<Product> = ledger::low_stock(state.products(), self.config.low_stock_threshold)
            .into_iter()
            .cloned()
            .collect();
        low
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::error::ErrorCode;
    use tillbook_core::{ProductCategory, ProductLookup};

    #[tokio::test]
    async fn test_create_updates_mirror() {
        let shop = shop().await;
        let product = stocked(&shop, "Shape Maple", 25000, 10).await;

        let state = shop.state().await;
        assert_eq!(state.product(&product.id), Some(&product));
    }

    #[tokio::test]
    async fn test_invalid_form_reports_fields_and_leaves_mirror() {
        let shop = shop().await;
        let mut form = product_form("", 1000, -1);
        form.cost_cents = 2000;

        let err = shop.create_product(form).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("name").is_some());
        assert!(err.field("price").is_some());
        assert!(err.field("quantity").is_some());
        assert!(shop.state().await.products().is_empty());
        assert_eq!(shop.database().products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let shop = shop().await;
        let mut product = stocked(&shop, "Roda 53mm", 14000, 8).await;
        product.category = ProductCategory::Wheels;

        let updated = shop.update_product(product).await.unwrap();
        assert_eq!(
            shop.state().await.product(&updated.id).map(|p| p.category),
            Some(ProductCategory::Wheels)
        );
        assert_eq!(
            shop.products_by_category(ProductCategory::Wheels).await.unwrap().len(),
            1
        );

        shop.delete_product(&updated.id).await.unwrap();
        shop.delete_product(&updated.id).await.unwrap();
        assert!(shop.state().await.products().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let shop = shop().await;
        let product = stocked(&shop, "Shape", 5000, 1).await;
        shop.delete_product(&product.id).await.unwrap();

        let err = shop.update_product(product).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(shop.state().await.products().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_stock_and_low_stock() {
        let shop = shop().await;
        let product = stocked(&shop, "Lixa", 7000, 2).await;
        stocked(&shop, "Shape", 25000, 20).await;

        assert_eq!(shop.low_stock().await.len(), 1);

        shop.adjust_stock(&product.id, 10).await.unwrap();
        assert!(shop.low_stock().await.is_empty());

        let err = shop.adjust_stock(&product.id, -100).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(shop.state().await.product(&product.id).map(|p| p.quantity), Some(12));
    }
}
