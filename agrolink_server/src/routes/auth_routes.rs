//! Public authentication routes: register, login and password recovery.
use actix_web::{web, HttpResponse};
use agrolink_engine::{IdentityApi, IdentityManagement, RegisterUser};
use log::*;

use crate::{
    auth::TokenIssuer,
    data_objects::{LoginRequest, LoginResponse, OkResponse, RecoverRequest},
    errors::ServerError,
    route,
};

route!(register => Post "/auth/register" impl IdentityManagement);
/// Creates a producer or consumer account. Duplicate emails (case-insensitive) are rejected with
/// a 400 by the engine.
pub async fn register<B: IdentityManagement>(
    body: web::Json<RegisterUser>,
    api: web::Data<IdentityApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST /auth/register");
    let user = api.register(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(login => Post "/auth/login" impl IdentityManagement);
/// Verifies the credentials and issues a bearer token carrying {sub, role}, valid for one day.
pub async fn login<B: IdentityManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<IdentityApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST /auth/login");
    let LoginRequest { email, password } = body.into_inner();
    let user = api.verify_credentials(&email, &password).await?;
    let token = signer.issue_token(user.id, user.role)?;
    debug!("💻️ Issued access token for {} #{}", user.role, user.id);
    Ok(HttpResponse::Ok().json(LoginResponse { token, role: user.role }))
}

route!(recover_password => Post "/auth/recover" impl IdentityManagement);
/// Resets the password for the given email. Always answers `{ok: true}`, whether or not the email
/// exists, so the endpoint cannot be used to enumerate accounts.
pub async fn recover_password<B: IdentityManagement>(
    body: web::Json<RecoverRequest>,
    api: web::Data<IdentityApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST /auth/recover");
    let RecoverRequest { email, new_password } = body.into_inner();
    api.recover_password(&email, &new_password).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
