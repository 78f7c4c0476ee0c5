//! Order lifecycle routes. The heavy lifting (state machine, stock reservation and compensation,
//! party checks) lives in the engine's `OrderFlowApi`; handlers only translate HTTP.
use actix_web::{web, HttpResponse};
use agrolink_engine::{
    db_types::{NewOrder, Role},
    IdentityManagement,
    LocationDirectory,
    MarketplaceDatabase,
    OrderFlowApi,
};
use log::*;

use crate::{auth::JwtClaims, errors::ServerError, route};

route!(create_order => Post "/orders" impl MarketplaceDatabase, IdentityManagement, LocationDirectory where requires [Role::Consumer]);
/// Places an order: every line item is validated against the stated producer, stock is reserved
/// atomically, and the total is computed server-side from the item snapshot.
pub async fn create_order<B>(
    claims: JwtClaims,
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase + IdentityManagement + LocationDirectory,
{
    trace!("💻️ POST /orders by consumer #{}", claims.sub);
    let order = api.place_order(&claims.context(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(my_orders => Get "/orders/my" impl MarketplaceDatabase, IdentityManagement, LocationDirectory where requires []);
/// Role-scoped listing: consumers and producers each see their own side, admins see everything.
pub async fn my_orders<B>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase + IdentityManagement + LocationDirectory,
{
    let orders = api.my_orders(&claims.context()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_detail => Get "/orders/{id}" impl MarketplaceDatabase, IdentityManagement, LocationDirectory where requires []);
pub async fn order_detail<B>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase + IdentityManagement + LocationDirectory,
{
    let order = api.order_detail(&claims.context(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(ship_order => Put "/orders/{id}/ship" impl MarketplaceDatabase, IdentityManagement, LocationDirectory where requires [Role::Producer]);
pub async fn ship_order<B>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase + IdentityManagement + LocationDirectory,
{
    let order = api.ship_order(&claims.context(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(deliver_order => Put "/orders/{id}/deliver" impl MarketplaceDatabase, IdentityManagement, LocationDirectory where requires [Role::Producer]);
pub async fn deliver_order<B>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase + IdentityManagement + LocationDirectory,
{
    let order = api.deliver_order(&claims.context(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Put "/orders/{id}/cancel" impl MarketplaceDatabase, IdentityManagement, LocationDirectory where requires []);
/// Role- and state-gated: parties may cancel pending orders, paid orders take the producer or an
/// admin, and shipped orders cannot be cancelled at all.
pub async fn cancel_order<B>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase + IdentityManagement + LocationDirectory,
{
    let order_id = path.into_inner();
    debug!("💻️ PUT /orders/{order_id}/cancel by {} #{}", claims.role, claims.sub);
    let order = api.cancel_order(&claims.context(), order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}
