use crate::db_types::{Order, Payment};

/// Emitted after an order has been created and its stock reserved.
#[derive(Debug, Clone)]
pub struct NewOrderEvent {
    pub order: Order,
}

/// Emitted after a payment has been confirmed and the order moved to `paid`.
#[derive(Debug, Clone)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub payment: Payment,
}

/// Emitted after the producer moved the order to `in_transit`.
#[derive(Debug, Clone)]
pub struct OrderShippedEvent {
    pub order: Order,
}

/// Emitted after the producer moved the order to `delivered`.
#[derive(Debug, Clone)]
pub struct OrderDeliveredEvent {
    pub order: Order,
}

/// Emitted after an order was cancelled and its stock restored.
#[derive(Debug, Clone)]
pub struct OrderCancelledEvent {
    pub order: Order,
}
