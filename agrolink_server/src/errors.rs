use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use agrolink_engine::{CatalogApiError, IdentityApiError, LocationApiError, MarketplaceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::TokenCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Token requerido")]
    MissingToken,
    #[error("Token inválido o expirado")]
    InvalidToken,
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    #[error("Could not create access token. {0}")]
    TokenCreation(String),
}

impl From<IdentityApiError> for ServerError {
    fn from(e: IdentityApiError) -> Self {
        match e {
            IdentityApiError::DatabaseError(_) | IdentityApiError::PasswordHashError(_) => {
                Self::BackendError(e.to_string())
            },
            IdentityApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            IdentityApiError::UserNotFound => Self::NoRecordFound(e.to_string()),
            IdentityApiError::EmailTaken |
            IdentityApiError::EmailInUse |
            IdentityApiError::InvalidRole |
            IdentityApiError::MissingFields |
            IdentityApiError::InvalidPhone => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
            CatalogApiError::ProductNotFound => Self::NoRecordFound(e.to_string()),
            CatalogApiError::MissingFields | CatalogApiError::InvalidPrice | CatalogApiError::InvalidStock => {
                Self::ValidationError(e.to_string())
            },
        }
    }
}

impl From<LocationApiError> for ServerError {
    fn from(e: LocationApiError) -> Self {
        match e {
            LocationApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
            LocationApiError::MissingFields => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<MarketplaceError> for ServerError {
    fn from(e: MarketplaceError) -> Self {
        match e {
            MarketplaceError::DatabaseError(_) => Self::BackendError(e.to_string()),
            // A missing order and an order the caller may not see are the same thing.
            MarketplaceError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            _ => Self::ValidationError(e.to_string()),
        }
    }
}
