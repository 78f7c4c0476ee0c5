use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{Location, NewLocation};

/// Creates or replaces the user's single location record.
pub async fn upsert_location(
    user_id: i64,
    location: NewLocation,
    conn: &mut SqliteConnection,
) -> Result<Location, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO locations (user_id, address, commune, region, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                address = excluded.address,
                commune = excluded.commune,
                region = excluded.region,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(location.address)
    .bind(location.commune)
    .bind(location.region)
    .bind(location.latitude)
    .bind(location.longitude)
    .fetch_one(conn)
    .await
}

pub async fn fetch_location_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Location>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM locations WHERE user_id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn delete_location_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM locations WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_locations_for_users(
    user_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<Location>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM locations WHERE user_id IN (");
    let mut separated = builder.separated(", ");
    for id in user_ids {
        separated.push_bind(id);
    }
    builder.push(")");
    builder.build_query_as::<Location>().fetch_all(conn).await
}
