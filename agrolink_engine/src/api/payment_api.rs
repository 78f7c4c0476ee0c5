use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{AuthContext, NewPayment, Payment},
    events::{EventProducers, OrderPaidEvent},
    traits::{MarketplaceDatabase, MarketplaceError},
};

/// `PaymentApi` is the payment ledger: it records self-reported payment confirmations against an
/// order and drives the `pending → paid` transition.
pub struct PaymentApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for PaymentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B> PaymentApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> PaymentApi<B>
where B: MarketplaceDatabase
{
    /// Records a payment confirmation. Guards, in order:
    /// 1. the order exists and belongs to the caller as consumer (conflated into "not found"),
    /// 2. the order is still payable (`pending`),
    /// 3. the amount equals the order total exactly,
    /// 4. no confirmed payment exists yet, enforced by the storage layer while the payment and
    ///    the status change commit in one transaction.
    ///
    /// Failure at any guard aborts with no mutation.
    pub async fn record_payment(&self, ctx: &AuthContext, payment: NewPayment) -> Result<Payment, MarketplaceError> {
        let order = self
            .db
            .fetch_order(payment.order_id)
            .await?
            .filter(|o| o.consumer_id == ctx.user_id)
            .ok_or(MarketplaceError::OrderNotFound(payment.order_id))?;
        if !order.status.is_payable() {
            return Err(MarketplaceError::OrderNotPayable);
        }
        if payment.amount != order.total {
            debug!(
                "🔄️💰️ Rejecting payment for order #{}: {} offered, {} due",
                order.id, payment.amount, order.total
            );
            return Err(MarketplaceError::AmountMismatch);
        }
        let (order, payment) = self.db.insert_payment_and_mark_paid(payment).await?;
        info!("🔄️💰️ Order #{} confirmed paid: {} via {}", order.id, payment.amount, payment.method);
        for emitter in &self.producers.order_paid_producer {
            emitter.publish_event(OrderPaidEvent { order: order.clone(), payment: payment.clone() }).await;
        }
        Ok(payment)
    }

    /// Payment history for an order, restricted to the order's two parties or an admin.
    pub async fn payments_for_order(&self, ctx: &AuthContext, order_id: i64) -> Result<Vec<Payment>, MarketplaceError> {
        let _order = self
            .db
            .fetch_order(order_id)
            .await?
            .filter(|o| ctx.is_admin() || o.consumer_id == ctx.user_id || o.producer_id == ctx.user_id)
            .ok_or(MarketplaceError::OrderNotFound(order_id))?;
        self.db.fetch_payments_for_order(order_id).await
    }
}
