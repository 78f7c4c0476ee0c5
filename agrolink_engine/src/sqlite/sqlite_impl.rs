//! `SqliteDatabase` is a concrete implementation of an AgroLink marketplace backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`traits`](crate::traits) module. Flows that touch several rows (order creation with its stock
//! reservation, cancellation with its compensation, payment confirmation) each run inside a single
//! transaction, so a failed step rolls the whole flow back.
use std::{collections::HashMap, fmt::Debug};

use agl_common::Money;
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, locations, new_pool, orders, payments, products, ratings, users};
use crate::{
    db_types::{
        Location,
        NewLocation,
        NewOrder,
        NewPayment,
        NewProduct,
        NewUser,
        Order,
        OrderStatusType,
        Payment,
        Product,
        ProductUpdate,
        ProfileUpdate,
        Rating,
        User,
    },
    order_objects::{
        OrderQueryFilter,
        OrderWithItems,
        ProductCard,
        ProductListing,
        ProductQueryFilter,
        RatingSummary,
    },
    traits::{
        CatalogApiError,
        CatalogManagement,
        IdentityApiError,
        IdentityManagement,
        LocationApiError,
        LocationDirectory,
        MarketplaceDatabase,
        MarketplaceError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database api with the default connection URL (taken from the
    /// `AGL_DATABASE_URL` environment variable).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl IdentityManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<User, IdentityApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_identity)?;
        users::insert_user(user, &mut conn).await
    }

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, IdentityApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_identity)?;
        Ok(users::fetch_user_by_id(id, &mut conn).await?)
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_identity)?;
        Ok(users::fetch_user_by_email(email, &mut conn).await?)
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User, IdentityApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_identity)?;
        users::update_profile(id, update, &mut conn).await
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, IdentityApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_identity)?;
        Ok(users::update_password(email, password_hash, &mut conn).await?)
    }

    async fn fetch_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, IdentityApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_identity)?;
        Ok(users::fetch_users_by_ids(ids, &mut conn).await?)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_product(&self, producer_id: i64, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        let product = products::insert_product(producer_id, product, &mut conn).await?;
        debug!("🗃️ Product [{}] created by producer #{producer_id}", product.name);
        Ok(product)
    }

    async fn update_product(
        &self,
        id: i64,
        producer_id: i64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        products::update_product(id, producer_id, update, &mut conn).await
    }

    async fn delete_product(&self, id: i64, producer_id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        Ok(products::delete_product(id, producer_id, &mut conn).await?)
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        Ok(products::fetch_product(id, &mut conn).await?)
    }

    async fn fetch_product_card(&self, id: i64) -> Result<Option<ProductCard>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        let Some(product) = products::fetch_product(id, &mut conn).await? else {
            return Ok(None);
        };
        let cards = products::enrich_products(vec![product], &mut conn).await?;
        Ok(cards.into_iter().next())
    }

    async fn search_products(&self, filter: ProductQueryFilter) -> Result<ProductListing, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        let total = products::count_products(&filter, &mut conn).await?;
        let page = products::search_products(&filter, &mut conn).await?;
        let items = products::enrich_products(page, &mut conn).await?;
        let page_size = filter.limit();
        let total_pages = ((total + page_size - 1) / page_size).max(1);
        Ok(ProductListing { items, page: filter.page(), page_size, total, total_pages })
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        Ok(products::fetch_categories(&mut conn).await?)
    }

    async fn fetch_products_for_producer(&self, producer_id: i64) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        Ok(products::fetch_products_for_producer(producer_id, &mut conn).await?)
    }

    async fn reserve_stock(&self, product_id: i64, quantity: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        Ok(products::reserve_stock(product_id, quantity, &mut conn).await?)
    }

    async fn restore_stock(&self, product_id: i64, quantity: i64) -> Result<(), CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_catalog)?;
        Ok(products::restore_stock(product_id, quantity, &mut conn).await?)
    }
}

impl LocationDirectory for SqliteDatabase {
    async fn upsert_location(&self, user_id: i64, location: NewLocation) -> Result<Location, LocationApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_location)?;
        Ok(locations::upsert_location(user_id, location, &mut conn).await?)
    }

    async fn fetch_location_for_user(&self, user_id: i64) -> Result<Option<Location>, LocationApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_location)?;
        Ok(locations::fetch_location_for_user(user_id, &mut conn).await?)
    }

    async fn delete_location_for_user(&self, user_id: i64) -> Result<bool, LocationApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_location)?;
        Ok(locations::delete_location_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_locations_for_users(&self, user_ids: &[i64]) -> Result<Vec<Location>, LocationApiError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_to_location)?;
        Ok(locations::fetch_locations_for_users(user_ids, &mut conn).await?)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, consumer_id: i64, order: NewOrder) -> Result<OrderWithItems, MarketplaceError> {
        if order.items.is_empty() {
            return Err(MarketplaceError::EmptyOrder);
        }
        let mut tx = self.pool.begin().await?;
        // Phase one: every line item must pass validation before any stock is touched.
        let mut snapshots = Vec::with_capacity(order.items.len());
        for item in &order.items {
            if item.quantity <= 0 {
                return Err(MarketplaceError::InvalidQuantity);
            }
            let product = products::fetch_product(item.product_id, &mut tx)
                .await?
                .ok_or(MarketplaceError::ProductNotFound(item.product_id))?;
            if product.producer_id != order.producer_id {
                return Err(MarketplaceError::ProducerMismatch);
            }
            if product.stock < item.quantity {
                return Err(MarketplaceError::InsufficientStock(product.name));
            }
            snapshots.push((product, item.quantity));
        }
        // Phase two: reserve per item. The conditional decrement re-checks the stock, so a
        // concurrent order since phase one surfaces here, and the transaction rolls every earlier
        // decrement back.
        for (product, quantity) in &snapshots {
            if !products::reserve_stock(product.id, *quantity, &mut tx).await? {
                return Err(MarketplaceError::InsufficientStock(product.name.clone()));
            }
        }
        let total: Money = snapshots.iter().map(|(p, q)| p.price * *q).sum();
        let db_order = orders::insert_order(consumer_id, order.producer_id, total, &mut tx).await?;
        let mut items = Vec::with_capacity(snapshots.len());
        for (product, quantity) in &snapshots {
            let item = orders::insert_order_item(db_order.id, product, *quantity, &mut tx).await?;
            items.push(item);
        }
        tx.commit().await?;
        debug!(
            "🗃️ Order #{} saved for consumer #{consumer_id}: {} items, total {total}",
            db_order.id,
            items.len()
        );
        Ok(OrderWithItems { order: db_order, items })
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(id, &mut conn).await?)
    }

    async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let Some(order) = orders::fetch_order(id, &mut conn).await? else {
            return Ok(None);
        };
        let items = orders::fetch_items_for_order(id, &mut conn).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<OrderWithItems>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        trace!("🗃️ Searching orders. {query}");
        let found = orders::search_orders(&query, &mut conn).await?;
        let order_ids: Vec<i64> = found.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<i64, Vec<_>> = HashMap::new();
        for item in orders::fetch_items_for_orders(&order_ids, &mut conn).await? {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
        let result = found
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect();
        Ok(result)
    }

    async fn transition_order(
        &self,
        id: i64,
        allowed_from: &[OrderStatusType],
        new_status: OrderStatusType,
    ) -> Result<Order, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?.ok_or(MarketplaceError::OrderNotFound(id))?;
        match orders::transition_order(id, allowed_from, new_status, &mut conn).await? {
            Some(updated) => {
                debug!("🗃️ Order #{id} moved {} → {new_status}", order.status);
                Ok(updated)
            },
            None => Err(MarketplaceError::InvalidTransition { from: order.status, to: new_status }),
        }
    }

    async fn cancel_order_with_compensation(&self, id: i64) -> Result<Order, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(id, &mut tx).await?.ok_or(MarketplaceError::OrderNotFound(id))?;
        let updated = orders::transition_order(
            id,
            &[OrderStatusType::Pending, OrderStatusType::Paid],
            OrderStatusType::Cancelled,
            &mut tx,
        )
        .await?
        .ok_or(MarketplaceError::InvalidTransition { from: order.status, to: OrderStatusType::Cancelled })?;
        // Compensation: restore exactly the snapshot quantities, whatever the products look like
        // today.
        let items = orders::fetch_items_for_order(id, &mut tx).await?;
        for item in &items {
            products::restore_stock(item.product_id, item.quantity, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{id} cancelled, stock restored on {} products", items.len());
        Ok(updated)
    }

    async fn insert_payment_and_mark_paid(&self, payment: NewPayment) -> Result<(Order, Payment), MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let order_id = payment.order_id;
        let order =
            orders::fetch_order(order_id, &mut tx).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        let payment = payments::insert_payment(payment, &mut tx).await?;
        let updated =
            orders::transition_order(order_id, &[OrderStatusType::Pending], OrderStatusType::Paid, &mut tx)
                .await?
                .ok_or(MarketplaceError::InvalidTransition { from: order.status, to: OrderStatusType::Paid })?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} paid: {} via {}", payment.amount, payment.method);
        Ok((updated, payment))
    }

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::fetch_payments_for_order(order_id, &mut conn).await?)
    }

    async fn insert_rating(
        &self,
        order_id: i64,
        producer_id: i64,
        consumer_id: i64,
        score: i64,
        comment: Option<String>,
    ) -> Result<Rating, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        ratings::insert_rating(order_id, producer_id, consumer_id, score, comment, &mut conn).await
    }

    async fn fetch_rating_for_order(&self, order_id: i64) -> Result<Option<Rating>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(ratings::fetch_rating_for_order(order_id, &mut conn).await?)
    }

    async fn rating_summary_for_producer(&self, producer_id: i64) -> Result<RatingSummary, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(ratings::rating_summary_for_producer(producer_id, &mut conn).await?)
    }

    async fn close(&mut self) -> Result<(), MarketplaceError> {
        self.pool.close().await;
        Ok(())
    }
}

fn sqlx_to_identity(e: sqlx::Error) -> IdentityApiError {
    IdentityApiError::DatabaseError(e.to_string())
}

fn sqlx_to_catalog(e: sqlx::Error) -> CatalogApiError {
    CatalogApiError::DatabaseError(e.to_string())
}

fn sqlx_to_location(e: sqlx::Error) -> LocationApiError {
    LocationApiError::DatabaseError(e.to_string())
}
