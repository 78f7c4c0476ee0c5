use agl_common::Money;
use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Order, OrderItem, OrderStatusType, Product},
    order_objects::OrderQueryFilter,
};

pub async fn insert_order(
    consumer_id: i64,
    producer_id: i64,
    total: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO orders (consumer_id, producer_id, total, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *;
        "#,
    )
    .bind(consumer_id)
    .bind(producer_id)
    .bind(total)
    .fetch_one(conn)
    .await
}

/// Writes one line item snapshot, denormalizing the product's current name and price.
pub async fn insert_order_item(
    order_id: i64,
    product: &Product,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, name, price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(quantity)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_items_for_orders(
    order_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM order_items WHERE order_id IN (");
    let mut separated = builder.separated(", ");
    for id in order_ids {
        separated.push_bind(id);
    }
    builder.push(") ORDER BY id ASC");
    builder.build_query_as::<OrderItem>().fetch_all(conn).await
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in descending order.
pub async fn search_orders(query: &OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE 1 = 1");
    if let Some(consumer_id) = query.consumer_id {
        builder.push(" AND consumer_id = ");
        builder.push_bind(consumer_id);
    }
    if let Some(producer_id) = query.producer_id {
        builder.push(" AND producer_id = ");
        builder.push_bind(producer_id);
    }
    if let Some(since) = query.since {
        builder.push(" AND created_at >= ");
        builder.push_bind(since);
    }
    if let Some(until) = query.until {
        builder.push(" AND created_at <= ");
        builder.push_bind(until);
    }
    if let Some(statuses) = query.status.as_ref().filter(|s| !s.is_empty()) {
        builder.push(" AND status IN (");
        let mut separated = builder.separated(", ");
        for status in statuses {
            separated.push_bind(status.to_string());
        }
        builder.push(")");
    }
    builder.push(" ORDER BY created_at DESC");
    trace!("📝️ Executing query: {}", builder.sql());
    builder.build_query_as::<Order>().fetch_all(conn).await
}

/// Moves the order to `new_status` iff its current status is one of `allowed_from`. The guard and
/// the write are a single statement. Returns `None` when the guard failed (or the order does not
/// exist).
pub async fn transition_order(
    id: i64,
    allowed_from: &[OrderStatusType],
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, status = ");
    builder.push_bind(new_status.to_string());
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND status IN (");
    let mut separated = builder.separated(", ");
    for status in allowed_from {
        separated.push_bind(status.to_string());
    }
    builder.push(") RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    builder.build_query_as::<Order>().fetch_optional(conn).await
}
