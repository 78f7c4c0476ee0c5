//! Catalog routes: the public listing/detail paths and the producer-scoped CRUD.
use actix_web::{web, HttpResponse};
use agrolink_engine::{
    db_types::{NewProduct, ProductUpdate, Role},
    order_objects::ProductQueryFilter,
    CatalogApi,
    CatalogManagement,
};
use log::*;

use crate::{auth::JwtClaims, data_objects::OkResponse, errors::ServerError, route};

route!(list_products => Get "/products" impl CatalogManagement);
/// Public paginated listing, filterable by category and the producer's region/commune.
pub async fn list_products<B: CatalogManagement>(
    filter: web::Query<ProductQueryFilter>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let listing = api.list_products(filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

route!(product_categories => Get "/products/categories" impl CatalogManagement);
pub async fn product_categories<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let categories = api.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

route!(my_products => Get "/products/mine" impl CatalogManagement where requires [Role::Producer]);
pub async fn my_products<B: CatalogManagement>(
    claims: JwtClaims,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let products = api.my_products(&claims.context()).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_detail => Get "/products/{id}" impl CatalogManagement);
/// Public detail view with the producer's public fields and location.
pub async fn product_detail<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let card = api.product_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(card))
}

route!(create_product => Post "/products" impl CatalogManagement where requires [Role::Producer]);
pub async fn create_product<B: CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST /products by producer #{}", claims.sub);
    let product = api.create_product(&claims.context(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(update_product => Put "/products/{id}" impl CatalogManagement where requires [Role::Producer]);
pub async fn update_product<B: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = api.update_product(&claims.context(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl CatalogManagement where requires [Role::Producer]);
pub async fn delete_product<B: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_product(&claims.context(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
