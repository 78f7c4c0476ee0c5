use log::debug;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{db_types::Rating, order_objects::RatingSummary, traits::MarketplaceError};

/// Inserts the post-delivery rating. The unique index on `order_id` is the authoritative
/// duplicate signal.
pub async fn insert_rating(
    order_id: i64,
    producer_id: i64,
    consumer_id: i64,
    score: i64,
    comment: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Rating, MarketplaceError> {
    let result = sqlx::query_as::<_, Rating>(
        r#"
            INSERT INTO ratings (order_id, producer_id, consumer_id, score, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(producer_id)
    .bind(consumer_id)
    .bind(score)
    .bind(comment)
    .fetch_one(conn)
    .await;
    match result {
        Ok(rating) => {
            debug!("📝️ Order #{order_id} rated {score}/5");
            Ok(rating)
        },
        Err(e) if is_unique_violation(&e) => Err(MarketplaceError::DuplicateRating),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_rating_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Rating>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ratings WHERE order_id = $1").bind(order_id).fetch_optional(conn).await
}

/// `AVG` over an empty set is NULL, which maps straight onto the `{None, 0}` contract.
pub async fn rating_summary_for_producer(
    producer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<RatingSummary, sqlx::Error> {
    let (average_score, count): (Option<f64>, i64) =
        sqlx::query_as("SELECT AVG(score), COUNT(*) FROM ratings WHERE producer_id = $1")
            .bind(producer_id)
            .fetch_one(conn)
            .await?;
    Ok(RatingSummary { average_score, count })
}
