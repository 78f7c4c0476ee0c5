use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use agrolink_engine::db_types::{AuthContext, Role};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The decoded access token: the subject's user id and role, plus the standard expiry fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl JwtClaims {
    /// The typed capability object handed to the engine APIs.
    pub fn context(&self) -> AuthContext {
        AuthContext::new(self.sub, self.role)
    }
}

/// Handlers receive claims from the ACL middleware, which verified the bearer token and stored
/// them in the request extensions. A route that takes `JwtClaims` without being wrapped by the
/// middleware answers 401.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .ok_or(ServerError::AuthenticationError(AuthError::MissingToken));
        ready(claims)
    }
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    config: AuthConfig,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Issue a new access token for the given user. The token carries {sub, role} and is valid
    /// for the configured duration (1 day by default). It does NOT refresh.
    pub fn issue_token(&self, user_id: i64, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.config.token_validity).timestamp(),
        };
        let key = EncodingKey::from_secret(self.config.jwt_secret.reveal().as_bytes());
        encode(&Header::default(), &claims, &key).map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verifies the signature and expiry of a bearer token. Any failure is reported as the same
    /// invalid-or-expired error.
    pub fn decode_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let key = DecodingKey::from_secret(self.config.jwt_secret.reveal().as_bytes());
        decode::<JwtClaims>(token, &key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: agl_common::Secret::new("test-secret".to_string()),
            token_validity: chrono::Duration::days(1),
        })
    }

    #[test]
    fn round_trip() {
        let issuer = issuer();
        let token = issuer.issue_token(42, Role::Producer).unwrap();
        let claims = issuer.decode_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Producer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = issuer().decode_token("made up nonsense").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
