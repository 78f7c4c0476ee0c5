use std::{collections::HashMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{AuthContext, NewOrder, Order, OrderStatusType, Role},
    events::{EventProducers, NewOrderEvent, OrderCancelledEvent, OrderDeliveredEvent, OrderShippedEvent},
    order_objects::{ContactInfo, EnrichedOrder, OrderQueryFilter, OrderWithItems},
    traits::{IdentityManagement, LocationDirectory, MarketplaceDatabase, MarketplaceError},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: placement with stock reservation,
/// the role-gated state machine, cancellation with compensation, and the enriched read paths.
///
/// The state machine:
///
/// | From       | Action  | Actor                       | To         |
/// |------------|---------|-----------------------------|------------|
/// | (none)     | create  | consumer                    | pending    |
/// | pending    | pay     | consumer (via `PaymentApi`) | paid       |
/// | pending    | ship    | producer (owner)            | in_transit |
/// | paid       | ship    | producer (owner)            | in_transit |
/// | in_transit | deliver | producer (owner)            | delivered  |
/// | pending    | cancel  | either party or admin       | cancelled  |
/// | paid       | cancel  | producer or admin only      | cancelled  |
///
/// `delivered` and `cancelled` are terminal; `in_transit` and `delivered` are never cancellable.
/// Every other combination is rejected with [`MarketplaceError::InvalidTransition`].
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase + IdentityManagement + LocationDirectory
{
    /// Submit a new order for the authenticated consumer.
    ///
    /// Every line item must reference an existing product of the stated producer with enough
    /// stock; the backend reserves stock and creates the order atomically, so a failing item
    /// leaves no partial mutation behind. The total is computed from the snapshot, never taken
    /// from the caller.
    pub async fn place_order(&self, ctx: &AuthContext, order: NewOrder) -> Result<EnrichedOrder, MarketplaceError> {
        if order.items.is_empty() {
            return Err(MarketplaceError::EmptyOrder);
        }
        let placed = self.db.insert_order(ctx.user_id, order).await?;
        info!("🔄️📦️ Order #{} placed by consumer #{} for {}", placed.order.id, ctx.user_id, placed.order.total);
        for emitter in &self.producers.new_order_producer {
            emitter.publish_event(NewOrderEvent { order: placed.order.clone() }).await;
        }
        let mut enriched = self.enrich_orders(vec![placed], ctx, false).await?;
        Ok(enriched.remove(0))
    }

    /// Role-scoped listing: consumers see their own orders with producer contact info, producers
    /// see orders against them with consumer contact info, admins see everything. Producer and
    /// admin views also carry each consumer's region/commune, resolved with one batched lookup
    /// over the page's distinct consumer ids.
    pub async fn my_orders(&self, ctx: &AuthContext) -> Result<Vec<EnrichedOrder>, MarketplaceError> {
        let filter = match ctx.role {
            Role::Consumer => OrderQueryFilter::default().with_consumer_id(ctx.user_id),
            Role::Producer => OrderQueryFilter::default().with_producer_id(ctx.user_id),
            Role::Admin => OrderQueryFilter::default(),
        };
        let found = self.db.search_orders(filter).await?;
        self.enrich_orders(found, ctx, false).await
    }

    /// Party-or-admin scoped detail view. A caller who is not a party sees the same "not found"
    /// as a missing order.
    pub async fn order_detail(&self, ctx: &AuthContext, order_id: i64) -> Result<EnrichedOrder, MarketplaceError> {
        let order = self
            .db
            .fetch_order_with_items(order_id)
            .await?
            .filter(|o| ctx.is_admin() || o.order.consumer_id == ctx.user_id || o.order.producer_id == ctx.user_id)
            .ok_or(MarketplaceError::OrderNotFound(order_id))?;
        let mut enriched = self.enrich_orders(vec![order], ctx, true).await?;
        Ok(enriched.remove(0))
    }

    /// The owning producer hands the order to delivery. Allowed from `pending` or `paid`.
    pub async fn ship_order(&self, ctx: &AuthContext, order_id: i64) -> Result<Order, MarketplaceError> {
        self.assert_owning_producer(ctx, order_id).await?;
        let order = self
            .db
            .transition_order(
                order_id,
                &[OrderStatusType::Pending, OrderStatusType::Paid],
                OrderStatusType::InTransit,
            )
            .await?;
        info!("🔄️📦️ Order #{order_id} shipped by producer #{}", ctx.user_id);
        for emitter in &self.producers.order_shipped_producer {
            emitter.publish_event(OrderShippedEvent { order: order.clone() }).await;
        }
        Ok(order)
    }

    /// The owning producer marks the order delivered. Requires `in_transit`; in particular,
    /// skipping the ship step is rejected.
    pub async fn deliver_order(&self, ctx: &AuthContext, order_id: i64) -> Result<Order, MarketplaceError> {
        self.assert_owning_producer(ctx, order_id).await?;
        let order =
            self.db.transition_order(order_id, &[OrderStatusType::InTransit], OrderStatusType::Delivered).await?;
        info!("🔄️📦️ Order #{order_id} delivered");
        for emitter in &self.producers.order_delivered_producer {
            emitter.publish_event(OrderDeliveredEvent { order: order.clone() }).await;
        }
        Ok(order)
    }

    /// Cancels the order and restores the reserved stock.
    ///
    /// Only the order's parties (or an admin) may cancel, only from `pending` or `paid`, and a
    /// `paid` order can no longer be cancelled by the consumer.
    pub async fn cancel_order(&self, ctx: &AuthContext, order_id: i64) -> Result<Order, MarketplaceError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        let is_party = order.consumer_id == ctx.user_id || order.producer_id == ctx.user_id;
        if !is_party && !ctx.is_admin() {
            return Err(MarketplaceError::OrderNotFound(order_id));
        }
        if !order.status.is_cancellable() {
            return Err(MarketplaceError::InvalidTransition {
                from: order.status,
                to: OrderStatusType::Cancelled,
            });
        }
        if order.status == OrderStatusType::Paid && ctx.role == Role::Consumer {
            return Err(MarketplaceError::PaidCancelForbidden);
        }
        let cancelled = self.db.cancel_order_with_compensation(order_id).await?;
        info!("🔄️📦️ Order #{order_id} cancelled by {} #{}", ctx.role, ctx.user_id);
        for emitter in &self.producers.order_cancelled_producer {
            emitter.publish_event(OrderCancelledEvent { order: cancelled.clone() }).await;
        }
        Ok(cancelled)
    }

    async fn assert_owning_producer(&self, ctx: &AuthContext, order_id: i64) -> Result<Order, MarketplaceError> {
        self.db
            .fetch_order(order_id)
            .await?
            .filter(|o| o.producer_id == ctx.user_id)
            .ok_or(MarketplaceError::OrderNotFound(order_id))
    }

    /// The manual batched join of the read paths: one user lookup for all counterparts and one
    /// location lookup for all consumers, then an in-memory stitch.
    async fn enrich_orders(
        &self,
        found: Vec<OrderWithItems>,
        viewer: &AuthContext,
        with_email: bool,
    ) -> Result<Vec<EnrichedOrder>, MarketplaceError> {
        let want_consumer = viewer.role != Role::Consumer;
        let want_producer = viewer.role != Role::Producer;
        let mut user_ids: Vec<i64> = Vec::new();
        for o in &found {
            if want_consumer {
                user_ids.push(o.order.consumer_id);
            }
            if want_producer {
                user_ids.push(o.order.producer_id);
            }
        }
        user_ids.sort_unstable();
        user_ids.dedup();
        let users = self.db.fetch_users_by_ids(&user_ids).await.map_err(backend_err)?;
        let users: HashMap<i64, _> = users.into_iter().map(|u| (u.id, u)).collect();

        // Region/commune is only revealed to producer/admin viewers.
        let mut consumer_ids: Vec<i64> =
            if want_consumer { found.iter().map(|o| o.order.consumer_id).collect() } else { Vec::new() };
        consumer_ids.sort_unstable();
        consumer_ids.dedup();
        let locations = self.db.fetch_locations_for_users(&consumer_ids).await.map_err(backend_err)?;
        let locations: HashMap<i64, _> = locations.into_iter().map(|l| (l.user_id, l)).collect();

        let result = found
            .into_iter()
            .map(|o| {
                let consumer = want_consumer
                    .then(|| users.get(&o.order.consumer_id).map(|u| ContactInfo::from_user(u, with_email)))
                    .flatten();
                let producer = want_producer
                    .then(|| users.get(&o.order.producer_id).map(|u| ContactInfo::from_user(u, with_email)))
                    .flatten();
                let location = want_consumer.then(|| locations.get(&o.order.consumer_id)).flatten();
                EnrichedOrder {
                    consumer_region: location.map(|l| l.region.clone()),
                    consumer_commune: location.map(|l| l.commune.clone()),
                    order: o.order,
                    items: o.items,
                    consumer,
                    producer,
                }
            })
            .collect();
        Ok(result)
    }
}

fn backend_err<E: std::fmt::Display>(e: E) -> MarketplaceError {
    MarketplaceError::DatabaseError(e.to_string())
}
