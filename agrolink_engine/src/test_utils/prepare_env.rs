use sqlx::migrate;

use crate::SqliteDatabase;

/// Creates a fresh in-memory database with all migrations applied.
///
/// The pool is capped at a single connection: every connection to `sqlite::memory:` is its own
/// database, so a larger pool would scatter the schema.
pub async fn prepare_test_env() -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating test database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    db
}
