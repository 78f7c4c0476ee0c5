//! Self-service profile and location routes. All of them operate on the authenticated user only.
use actix_web::{web, HttpResponse};
use agrolink_engine::{
    db_types::{NewLocation, ProfileUpdate},
    IdentityApi,
    IdentityManagement,
    LocationApi,
    LocationDirectory,
};
use log::*;

use crate::{auth::JwtClaims, data_objects::OkResponse, errors::ServerError, route};

route!(me => Get "/me" impl IdentityManagement where requires []);
pub async fn me<B: IdentityManagement>(
    claims: JwtClaims,
    api: web::Data<IdentityApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = api.profile(claims.sub).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(update_me => Put "/me" impl IdentityManagement where requires []);
pub async fn update_me<B: IdentityManagement>(
    claims: JwtClaims,
    body: web::Json<ProfileUpdate>,
    api: web::Data<IdentityApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ PUT /me for #{}", claims.sub);
    let user = api.update_profile(claims.sub, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(my_location => Get "/location/my" impl LocationDirectory where requires []);
pub async fn my_location<B: LocationDirectory>(
    claims: JwtClaims,
    api: web::Data<LocationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let location = api.my_location(&claims.context()).await?;
    Ok(HttpResponse::Ok().json(location))
}

route!(set_my_location => Put "/location/my" impl LocationDirectory where requires []);
pub async fn set_my_location<B: LocationDirectory>(
    claims: JwtClaims,
    body: web::Json<NewLocation>,
    api: web::Data<LocationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ PUT /location/my for #{}", claims.sub);
    let location = api.set_my_location(&claims.context(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(location))
}

route!(delete_my_location => Delete "/location/my" impl LocationDirectory where requires []);
pub async fn delete_my_location<B: LocationDirectory>(
    claims: JwtClaims,
    api: web::Data<LocationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_my_location(&claims.context()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
