use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use super::is_unique_violation;
use crate::{
    db_types::{NewUser, ProfileUpdate, User},
    traits::IdentityApiError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, IdentityApiError> {
    let result = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (name, email, password_hash, role, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role)
    .bind(user.phone)
    .fetch_one(conn)
    .await;
    match result {
        Ok(user) => {
            debug!("📝️ User [{}] registered with id {}", user.email, user.id);
            Ok(user)
        },
        Err(e) if is_unique_violation(&e) => Err(IdentityApiError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// The email column uses NOCASE collation, so the lookup is case-insensitive.
pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await
}

pub async fn update_profile(
    id: i64,
    update: ProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<User, IdentityApiError> {
    let result = sqlx::query_as(
        r#"
            UPDATE users SET name = $1, email = $2, phone = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(update.name)
    .bind(update.email)
    .bind(update.phone)
    .bind(id)
    .fetch_optional(conn)
    .await;
    match result {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(IdentityApiError::UserNotFound),
        Err(e) if is_unique_violation(&e) => Err(IdentityApiError::EmailInUse),
        Err(e) => Err(e.into()),
    }
}

/// Returns `false` when no account holds the given email.
pub async fn update_password(
    email: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = CURRENT_TIMESTAMP WHERE email = $2")
        .bind(password_hash)
        .bind(email)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_users_by_ids(ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM users WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    builder.push(")");
    builder.build_query_as::<User>().fetch_all(conn).await
}
