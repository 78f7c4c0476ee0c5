use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderStatusType, Payment, Rating},
    order_objects::{OrderQueryFilter, OrderWithItems, RatingSummary},
};

/// This trait defines the order/payment/rating core for backends supporting the AgroLink engine.
///
/// This behaviour includes:
/// * Creating orders atomically with their stock reservation.
/// * Moving orders through the lifecycle state machine.
/// * Cancelling orders with compensating stock restoration.
/// * Recording exactly one confirmed payment per order.
/// * Recording exactly one post-delivery rating per order.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction:
    /// * validates every line item (product exists, belongs to the stated producer),
    /// * reserves stock per item with a conditional decrement,
    /// * inserts the order with status `pending` and its item snapshots, with the total computed
    ///   from the snapshot prices.
    ///
    /// Any failed item rolls the whole transaction back, including earlier decrements.
    async fn insert_order(&self, consumer_id: i64, order: NewOrder) -> Result<OrderWithItems, MarketplaceError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, MarketplaceError>;

    async fn fetch_order_with_items(&self, id: i64) -> Result<Option<OrderWithItems>, MarketplaceError>;

    /// Fetches orders matching the filter, each with its item snapshots, newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<OrderWithItems>, MarketplaceError>;

    /// Moves the order to `new_status` iff its current status is in `allowed_from`. The guard and
    /// the write are one statement, so a concurrent transition cannot slip in between.
    /// Returns [`MarketplaceError::InvalidTransition`] when the guard fails.
    async fn transition_order(
        &self,
        id: i64,
        allowed_from: &[OrderStatusType],
        new_status: OrderStatusType,
    ) -> Result<Order, MarketplaceError>;

    /// Cancels the order and restores the snapshot quantities to their products, in one
    /// transaction. The status guard (`pending`/`paid`) doubles as the double-compensation guard.
    async fn cancel_order_with_compensation(&self, id: i64) -> Result<Order, MarketplaceError>;

    /// In a single transaction, inserts a confirmed payment for the order and transitions the
    /// order `pending → paid`. The storage-level uniqueness constraint on confirmed payments is
    /// the authoritative duplicate signal. Returns the updated order and the payment record.
    async fn insert_payment_and_mark_paid(&self, payment: NewPayment) -> Result<(Order, Payment), MarketplaceError>;

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, MarketplaceError>;

    /// Inserts the post-delivery rating. The storage-level uniqueness constraint on `order_id` is
    /// the authoritative duplicate signal.
    async fn insert_rating(
        &self,
        order_id: i64,
        producer_id: i64,
        consumer_id: i64,
        score: i64,
        comment: Option<String>,
    ) -> Result<Rating, MarketplaceError>;

    async fn fetch_rating_for_order(&self, order_id: i64) -> Result<Option<Rating>, MarketplaceError>;

    /// Aggregates `{average, count}` over all ratings for the producer. `{None, 0}` when unrated.
    async fn rating_summary_for_producer(&self, producer_id: i64) -> Result<RatingSummary, MarketplaceError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), MarketplaceError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("Pedido no encontrado")]
    OrderNotFound(i64),
    #[error("Items requeridos")]
    EmptyOrder,
    #[error("Cantidad inválida")]
    InvalidQuantity,
    #[error("Producto no existe: {0}")]
    ProductNotFound(i64),
    #[error("Todos los items deben ser del mismo productor")]
    ProducerMismatch,
    #[error("Stock insuficiente para {0}")]
    InsufficientStock(String),
    #[error("El pedido no admite la transición {from} → {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("Solo el productor puede cancelar un pedido pagado")]
    PaidCancelForbidden,
    #[error("El pedido no admite pagos en su estado actual")]
    OrderNotPayable,
    #[error("El pedido ya tiene un pago confirmado")]
    DuplicatePayment,
    #[error("El monto no coincide con el total del pedido")]
    AmountMismatch,
    #[error("Pedido no válido para calificación")]
    OrderNotRateable,
    #[error("El pedido ya fue calificado")]
    DuplicateRating,
    #[error("Score debe estar entre 1 y 5")]
    InvalidScore,
}

impl From<sqlx::Error> for MarketplaceError {
    fn from(e: sqlx::Error) -> Self {
        MarketplaceError::DatabaseError(e.to_string())
    }
}
