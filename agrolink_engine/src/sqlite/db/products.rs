use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    order_objects::{ProductQueryFilter, ProductCard},
    traits::CatalogApiError,
};

pub async fn insert_product(
    producer_id: i64,
    product: NewProduct,
    conn: &mut SqliteConnection,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, stock, category, image_url, producer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.category)
    .bind(product.image_url)
    .bind(producer_id)
    .fetch_one(conn)
    .await
}

/// Applies a partial update, scoped to the owning producer. Returns `None` when nothing matched.
pub async fn update_product(
    id: i64,
    producer_id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, CatalogApiError> {
    if update.is_empty() {
        return Err(CatalogApiError::MissingFields);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(category);
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND producer_id = ");
    builder.push_bind(producer_id);
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    Ok(product)
}

pub async fn delete_product(id: i64, producer_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND producer_id = $2")
        .bind(id)
        .bind(producer_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ProductQueryFilter) {
    if let Some(category) = &filter.category {
        builder.push(" AND category = ");
        builder.push_bind(category.clone());
    }
    if let Some(region) = &filter.region {
        builder.push(
            " AND EXISTS (SELECT 1 FROM locations WHERE locations.user_id = products.producer_id AND \
             locations.region = ",
        );
        builder.push_bind(region.clone());
        builder.push(")");
    }
    if let Some(commune) = &filter.commune {
        builder.push(
            " AND EXISTS (SELECT 1 FROM locations WHERE locations.user_id = products.producer_id AND \
             locations.commune = ",
        );
        builder.push_bind(commune.clone());
        builder.push(")");
    }
}

/// Fetches one page of products matching the filter, newest first.
pub async fn search_products(
    filter: &ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE 1 = 1");
    push_filters(&mut builder, filter);
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(filter.limit());
    builder.push(" OFFSET ");
    builder.push_bind(filter.offset());
    trace!("📝️ Executing query: {}", builder.sql());
    builder.build_query_as::<Product>().fetch_all(conn).await
}

/// Total match count for the same filter, for server-side pagination.
pub async fn count_products(filter: &ProductQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1 = 1");
    push_filters(&mut builder, filter);
    let (count,): (i64,) = builder.build_query_as().fetch_one(conn).await?;
    Ok(count)
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT category FROM products WHERE category IS NOT NULL AND category != '' ORDER BY category ASC",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

pub async fn fetch_products_for_producer(
    producer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE producer_id = $1 ORDER BY created_at DESC")
        .bind(producer_id)
        .fetch_all(conn)
        .await
}

/// The reservation primitive: a conditional decrement that only succeeds while at least
/// `quantity` units remain. The check and the write are one statement, so concurrent orders on the
/// same product cannot both pass a stale check and stock never goes negative.
pub async fn reserve_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND stock >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// The compensating half of a reservation: adds the snapshot quantity back.
pub async fn restore_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET stock = stock + $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(product_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(())
}

/// Attaches producer public fields and location to a page of products, with one batched lookup per
/// table instead of a per-product join.
pub async fn enrich_products(
    products: Vec<Product>,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductCard>, sqlx::Error> {
    use std::collections::HashMap;

    use super::{locations, users};
    use crate::order_objects::ProducerPublic;

    let mut producer_ids: Vec<i64> = products.iter().map(|p| p.producer_id).collect();
    producer_ids.sort_unstable();
    producer_ids.dedup();
    let producers = users::fetch_users_by_ids(&producer_ids, &mut *conn).await?;
    let producers: HashMap<i64, _> = producers.into_iter().map(|u| (u.id, u)).collect();
    let locs = locations::fetch_locations_for_users(&producer_ids, &mut *conn).await?;
    let locs: HashMap<i64, _> = locs.into_iter().map(|l| (l.user_id, l)).collect();
    let cards = products
        .into_iter()
        .map(|product| {
            let producer_public = producers
                .get(&product.producer_id)
                .map(|u| ProducerPublic { name: u.name.clone(), phone: u.phone.clone() });
            let producer_location = locs.get(&product.producer_id).cloned();
            ProductCard { product, producer_public, producer_location }
        })
        .collect();
    Ok(cards)
}
