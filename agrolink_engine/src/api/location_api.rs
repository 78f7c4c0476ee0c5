use std::fmt::Debug;

use crate::{
    db_types::{AuthContext, Location, NewLocation},
    traits::{LocationApiError, LocationDirectory},
};

/// `LocationApi` manages the one-address-per-user directory with set-if-authenticated-self
/// semantics: callers can only ever touch their own record.
pub struct LocationApi<B> {
    db: B,
}

impl<B> Debug for LocationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocationApi")
    }
}

impl<B> LocationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> LocationApi<B>
where B: LocationDirectory
{
    pub async fn my_location(&self, ctx: &AuthContext) -> Result<Option<Location>, LocationApiError> {
        self.db.fetch_location_for_user(ctx.user_id).await
    }

    pub async fn set_my_location(&self, ctx: &AuthContext, location: NewLocation) -> Result<Location, LocationApiError> {
        if location.address.trim().is_empty() ||
            location.commune.trim().is_empty() ||
            location.region.trim().is_empty()
        {
            return Err(LocationApiError::MissingFields);
        }
        self.db.upsert_location(ctx.user_id, location).await
    }

    pub async fn delete_my_location(&self, ctx: &AuthContext) -> Result<(), LocationApiError> {
        // Deleting an absent record is already the desired end state.
        let _ = self.db.delete_location_for_user(ctx.user_id).await?;
        Ok(())
    }
}
