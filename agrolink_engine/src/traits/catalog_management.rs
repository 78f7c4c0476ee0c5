use thiserror::Error;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    order_objects::{ProductCard, ProductListing, ProductQueryFilter},
};

/// Product catalog behaviour.
///
/// Stock mutation goes through [`reserve_stock`]/[`restore_stock`], which are individually atomic:
/// a reservation is a conditional decrement that only succeeds while enough stock remains, so
/// inventory can never go negative under concurrent order placement.
///
/// [`reserve_stock`]: CatalogManagement::reserve_stock
/// [`restore_stock`]: CatalogManagement::restore_stock
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    async fn insert_product(&self, producer_id: i64, product: NewProduct) -> Result<Product, CatalogApiError>;

    /// Applies a partial update to a product owned by `producer_id`. Returns `None` when the
    /// product does not exist or belongs to someone else (deliberately indistinguishable).
    async fn update_product(
        &self,
        id: i64,
        producer_id: i64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, CatalogApiError>;

    /// Returns `false` when the product does not exist or belongs to someone else.
    async fn delete_product(&self, id: i64, producer_id: i64) -> Result<bool, CatalogApiError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// Public detail view: the product joined with its producer's public fields and location.
    async fn fetch_product_card(&self, id: i64) -> Result<Option<ProductCard>, CatalogApiError>;

    /// Public paginated listing, filterable by category and by the producer's region/commune.
    async fn search_products(&self, filter: ProductQueryFilter) -> Result<ProductListing, CatalogApiError>;

    /// Distinct non-empty categories, sorted.
    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogApiError>;

    async fn fetch_products_for_producer(&self, producer_id: i64) -> Result<Vec<Product>, CatalogApiError>;

    /// Atomically decrements stock by `quantity` iff at least that much remains. Returns `false`
    /// when the condition failed (insufficient stock or unknown product).
    async fn reserve_stock(&self, product_id: i64, quantity: i64) -> Result<bool, CatalogApiError>;

    /// Adds `quantity` back to the product's stock. The compensating half of a reservation.
    async fn restore_stock(&self, product_id: i64, quantity: i64) -> Result<(), CatalogApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("name, price y stock son obligatorios")]
    MissingFields,
    #[error("Precio inválido")]
    InvalidPrice,
    #[error("Stock inválido")]
    InvalidStock,
    #[error("Producto no encontrado o sin permisos")]
    ProductNotFound,
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}
