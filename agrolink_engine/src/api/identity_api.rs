use std::fmt::Debug;

use log::*;
use serde::Deserialize;

use crate::{
    db_types::{NewUser, ProfileUpdate, Role, User},
    helpers::{is_valid_phone, normalize_email},
    password::{hash_password, verify_password, DUMMY_HASH},
    traits::{IdentityApiError, IdentityManagement},
};

/// A registration request, before credential hashing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: String,
}

/// `IdentityApi` handles registration, credential verification and self-service profile updates.
pub struct IdentityApi<B> {
    db: B,
}

impl<B> Debug for IdentityApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IdentityApi")
    }
}

impl<B> IdentityApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> IdentityApi<B>
where B: IdentityManagement
{
    /// Registers a new producer or consumer. Admin accounts cannot be self-registered. The email
    /// must be unique (case-insensitive); the storage layer reports the duplicate.
    pub async fn register(&self, reg: RegisterUser) -> Result<User, IdentityApiError> {
        if reg.role == Role::Admin {
            return Err(IdentityApiError::InvalidRole);
        }
        if !is_valid_phone(&reg.phone) {
            return Err(IdentityApiError::InvalidPhone);
        }
        let password_hash = hash_password(&reg.password)?;
        let user = NewUser {
            name: reg.name,
            email: normalize_email(&reg.email),
            password_hash,
            role: reg.role,
            phone: reg.phone,
        };
        let user = self.db.create_user(user).await?;
        debug!("🔑️ New {} registered: {}", user.role, user.email);
        Ok(user)
    }

    /// Verifies an email/password pair. A verification runs even when the email is unknown, so
    /// response timing does not reveal whether an account exists.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, IdentityApiError> {
        let user = self.db.fetch_user_by_email(&normalize_email(email)).await?;
        let hash = user.as_ref().map(|u| u.password_hash.as_str()).unwrap_or(DUMMY_HASH);
        let password_valid = verify_password(password, hash);
        match user {
            Some(user) if password_valid => Ok(user),
            _ => Err(IdentityApiError::InvalidCredentials),
        }
    }

    /// Resets the password for the given email. Always succeeds from the caller's point of view;
    /// unknown emails are only logged.
    pub async fn recover_password(&self, email: &str, new_password: &str) -> Result<(), IdentityApiError> {
        let password_hash = hash_password(new_password)?;
        let updated = self.db.update_password(&normalize_email(email), &password_hash).await?;
        if !updated {
            debug!("🔑️ Password recovery requested for an unknown email");
        }
        Ok(())
    }

    pub async fn profile(&self, user_id: i64) -> Result<User, IdentityApiError> {
        self.db.fetch_user_by_id(user_id).await?.ok_or(IdentityApiError::UserNotFound)
    }

    pub async fn update_profile(&self, user_id: i64, mut update: ProfileUpdate) -> Result<User, IdentityApiError> {
        if update.name.trim().is_empty() || update.email.trim().is_empty() || update.phone.trim().is_empty() {
            return Err(IdentityApiError::MissingFields);
        }
        if !is_valid_phone(&update.phone) {
            return Err(IdentityApiError::InvalidPhone);
        }
        update.email = normalize_email(&update.email);
        self.db.update_profile(user_id, update).await
    }
}
