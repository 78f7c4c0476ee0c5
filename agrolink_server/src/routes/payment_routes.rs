//! Payment ledger routes.
use actix_web::{web, HttpResponse};
use agrolink_engine::{
    db_types::{NewPayment, Role},
    MarketplaceDatabase,
    PaymentApi,
};
use log::*;

use crate::{auth::JwtClaims, errors::ServerError, route};

route!(create_payment => Post "/payments" impl MarketplaceDatabase where requires [Role::Consumer]);
/// Records a self-reported payment confirmation. The amount must match the order total exactly,
/// the order must still be pending, and at most one confirmed payment can ever exist per order;
/// on success the order moves to `paid`.
pub async fn create_payment<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<NewPayment>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST /payments by consumer #{}", claims.sub);
    let payment = api.record_payment(&claims.context(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payments_for_order => Get "/payments/{order_id}" impl MarketplaceDatabase where requires []);
/// Payment history for an order; restricted to the order's parties or an admin.
pub async fn payments_for_order<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payments = api.payments_for_order(&claims.context(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payments))
}
