//! Helpers for setting up engine tests against a real (in-memory) SQLite database.
#[cfg(feature = "sqlite")]
mod prepare_env;

#[cfg(feature = "sqlite")]
pub use prepare_env::prepare_test_env;
