use log::debug;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{NewPayment, Payment},
    traits::MarketplaceError,
};

/// Inserts a confirmed payment. The partial unique index on `(order_id) WHERE status =
/// 'confirmed'` is the authoritative duplicate signal.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, MarketplaceError> {
    let result = sqlx::query_as::<_, Payment>(
        r#"
            INSERT INTO payments (order_id, amount, method, status)
            VALUES ($1, $2, $3, 'confirmed')
            RETURNING *;
        "#,
    )
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.method)
    .fetch_one(conn)
    .await;
    match result {
        Ok(payment) => {
            debug!("📝️ Payment {} recorded against order #{}", payment.id, payment.order_id);
            Ok(payment)
        },
        Err(e) if is_unique_violation(&e) => Err(MarketplaceError::DuplicatePayment),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_payments_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}
