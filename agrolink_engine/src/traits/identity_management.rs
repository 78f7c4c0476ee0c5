use thiserror::Error;

use crate::db_types::{NewUser, ProfileUpdate, User};

/// User directory behaviour: registration, credential lookup and self-service profile updates.
///
/// Email uniqueness is case-insensitive and enforced by the storage layer; a uniqueness violation
/// is the authoritative duplicate signal, not a pre-insert existence check.
#[allow(async_fn_in_trait)]
pub trait IdentityManagement: Clone {
    async fn create_user(&self, user: NewUser) -> Result<User, IdentityApiError>;

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, IdentityApiError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityApiError>;

    /// Updates name/email/phone for the given user. Fails with [`IdentityApiError::EmailInUse`] if
    /// another account already holds the new email.
    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User, IdentityApiError>;

    /// Replaces the stored password hash. Returns `false` when the email is unknown; callers that
    /// must not leak account existence ignore the flag.
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, IdentityApiError>;

    /// Batch lookup used by the order read paths to attach counterpart contact details.
    async fn fetch_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, IdentityApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum IdentityApiError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("Correo ya registrado")]
    EmailTaken,
    #[error("Email ya está en uso")]
    EmailInUse,
    #[error("Rol inválido")]
    InvalidRole,
    #[error("name, email y phone son obligatorios")]
    MissingFields,
    #[error("Phone inválido")]
    InvalidPhone,
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    #[error("Usuario no encontrado")]
    UserNotFound,
    #[error("Could not hash the supplied password. {0}")]
    PasswordHashError(String),
}

impl From<sqlx::Error> for IdentityApiError {
    fn from(e: sqlx::Error) -> Self {
        IdentityApiError::DatabaseError(e.to_string())
    }
}
