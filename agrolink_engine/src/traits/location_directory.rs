use thiserror::Error;

use crate::db_types::{Location, NewLocation};

/// One address record per user, with set-if-authenticated-self semantics.
#[allow(async_fn_in_trait)]
pub trait LocationDirectory: Clone {
    /// Creates or replaces the user's location record.
    async fn upsert_location(&self, user_id: i64, location: NewLocation) -> Result<Location, LocationApiError>;

    async fn fetch_location_for_user(&self, user_id: i64) -> Result<Option<Location>, LocationApiError>;

    /// Returns `false` when no record existed.
    async fn delete_location_for_user(&self, user_id: i64) -> Result<bool, LocationApiError>;

    /// Batch lookup keyed by owner ids. Used by the order read paths to attach the consumers'
    /// region/commune without an N+1 query.
    async fn fetch_locations_for_users(&self, user_ids: &[i64]) -> Result<Vec<Location>, LocationApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum LocationApiError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("address, commune y region son obligatorios")]
    MissingFields,
}

impl From<sqlx::Error> for LocationApiError {
    fn from(e: sqlx::Error) -> Self {
        LocationApiError::DatabaseError(e.to_string())
    }
}
