//! Rating store routes.
use actix_web::{web, HttpResponse};
use agrolink_engine::{
    db_types::{NewRating, Role},
    MarketplaceDatabase,
    RatingApi,
};
use log::*;

use crate::{auth::JwtClaims, errors::ServerError, route};

route!(create_rating => Post "/ratings" impl MarketplaceDatabase where requires [Role::Consumer]);
/// Rates a delivered order. Only the consumer who placed the order may rate it, exactly once.
pub async fn create_rating<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<NewRating>,
    api: web::Data<RatingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST /ratings by consumer #{}", claims.sub);
    let rating = api.create_rating(&claims.context(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rating))
}

route!(producer_rating_summary => Get "/ratings/producer/{producer_id}" impl MarketplaceDatabase);
/// Public aggregate: `{averageScore, count}`, with `averageScore: null` for unrated producers.
pub async fn producer_rating_summary<B: MarketplaceDatabase>(
    path: web::Path<i64>,
    api: web::Data<RatingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let summary = api.producer_summary(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
