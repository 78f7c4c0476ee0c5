use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{AuthContext, NewProduct, Product, ProductUpdate},
    order_objects::{ProductCard, ProductListing, ProductQueryFilter},
    traits::{CatalogApiError, CatalogManagement},
};

/// `CatalogApi` owns the product catalog: producer-scoped CRUD and the public listing paths.
/// Stock mutation is not exposed here; it belongs to the order flow.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn create_product(&self, ctx: &AuthContext, product: NewProduct) -> Result<Product, CatalogApiError> {
        if product.name.trim().is_empty() {
            return Err(CatalogApiError::MissingFields);
        }
        if product.price.is_negative() {
            return Err(CatalogApiError::InvalidPrice);
        }
        if product.stock < 0 {
            return Err(CatalogApiError::InvalidStock);
        }
        self.db.insert_product(ctx.user_id, product).await
    }

    /// Applies a partial update to one of the caller's own products.
    pub async fn update_product(
        &self,
        ctx: &AuthContext,
        id: i64,
        update: ProductUpdate,
    ) -> Result<Product, CatalogApiError> {
        if update.price.map(|p| p.is_negative()).unwrap_or(false) {
            return Err(CatalogApiError::InvalidPrice);
        }
        if update.stock.map(|s| s < 0).unwrap_or(false) {
            return Err(CatalogApiError::InvalidStock);
        }
        self.db.update_product(id, ctx.user_id, update).await?.ok_or(CatalogApiError::ProductNotFound)
    }

    pub async fn delete_product(&self, ctx: &AuthContext, id: i64) -> Result<(), CatalogApiError> {
        if !self.db.delete_product(id, ctx.user_id).await? {
            return Err(CatalogApiError::ProductNotFound);
        }
        info!("🛒️ Product #{id} deleted by producer #{}", ctx.user_id);
        Ok(())
    }

    /// Public paginated listing with producer enrichment.
    pub async fn list_products(&self, filter: ProductQueryFilter) -> Result<ProductListing, CatalogApiError> {
        self.db.search_products(filter).await
    }

    /// Public detail view, enriched with the producer's public fields and location.
    pub async fn product_detail(&self, id: i64) -> Result<ProductCard, CatalogApiError> {
        self.db.fetch_product_card(id).await?.ok_or(CatalogApiError::ProductNotFound)
    }

    pub async fn categories(&self) -> Result<Vec<String>, CatalogApiError> {
        self.db.fetch_categories().await
    }

    pub async fn my_products(&self, ctx: &AuthContext) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products_for_producer(ctx.user_id).await
    }
}
