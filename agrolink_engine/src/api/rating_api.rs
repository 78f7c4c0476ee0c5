use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{AuthContext, NewRating, OrderStatusType, Rating},
    order_objects::RatingSummary,
    traits::{MarketplaceDatabase, MarketplaceError},
};

/// `RatingApi` records a single post-delivery score per order and serves the public producer
/// aggregate.
pub struct RatingApi<B> {
    db: B,
}

impl<B> Debug for RatingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RatingApi")
    }
}

impl<B> RatingApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> RatingApi<B>
where B: MarketplaceDatabase
{
    /// Creates the rating for a delivered order. Only the consumer who placed the order may rate
    /// it, exactly once; the storage layer reports the duplicate.
    pub async fn create_rating(&self, ctx: &AuthContext, rating: NewRating) -> Result<Rating, MarketplaceError> {
        if !(1..=5).contains(&rating.score) {
            return Err(MarketplaceError::InvalidScore);
        }
        let order = self
            .db
            .fetch_order(rating.order_id)
            .await?
            .filter(|o| o.consumer_id == ctx.user_id)
            .ok_or(MarketplaceError::OrderNotFound(rating.order_id))?;
        if order.status != OrderStatusType::Delivered {
            return Err(MarketplaceError::OrderNotRateable);
        }
        let rating = self
            .db
            .insert_rating(order.id, order.producer_id, order.consumer_id, rating.score, rating.comment)
            .await?;
        info!("⭐️ Order #{} rated {}/5 by consumer #{}", order.id, rating.score, ctx.user_id);
        Ok(rating)
    }

    /// Public aggregate over all ratings for a producer. Answers `{null, 0}` when unrated rather
    /// than erroring.
    pub async fn producer_summary(&self, producer_id: i64) -> Result<RatingSummary, MarketplaceError> {
        self.db.rating_summary_for_producer(producer_id).await
    }
}
