//! Access control middleware for the AgroLink server.
//! This middleware can be placed on any route or service.
//!
//! It verifies the bearer token in the `Authorization` header, stores the decoded claims in the
//! request extensions for handlers to extract, and checks the caller's role against the roles
//! required by the route. Admins pass every role check. A missing or invalid token yields 401; a
//! wrong role yields 403. An empty role list means "any authenticated user".

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    http::header,
    web,
    Error,
    HttpMessage,
};
use agrolink_engine::db_types::Role;
use futures::future::{ok, Future, Ready};

use crate::{
    auth::TokenIssuer,
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let issuer = req.app_data::<web::Data<TokenIssuer>>().cloned().ok_or_else(|| {
                log::error!("No TokenIssuer found in app data");
                ErrorInternalServerError("Token verifier is not configured")
            })?;
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim_start_matches("Bearer ").trim())
                .ok_or(ServerError::AuthenticationError(AuthError::MissingToken))?;
            let claims = issuer.decode_token(token).map_err(ServerError::AuthenticationError)?;
            if !required_roles.is_empty() && claims.role != Role::Admin && !required_roles.contains(&claims.role) {
                return Err(ServerError::InsufficientPermissions("Permisos insuficientes".to_string()).into());
            }
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
