//! Backend traits for the AgroLink engine.
//!
//! A storage backend implements these traits in order to power the engine APIs. The flows with
//! multiple mutations (order creation with stock reservation, cancellation with compensation,
//! payment confirmation) are trait methods rather than API-level compositions so that a backend
//! can make them atomic.
mod catalog_management;
mod identity_management;
mod location_directory;
mod marketplace_database;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use identity_management::{IdentityApiError, IdentityManagement};
pub use location_directory::{LocationApiError, LocationDirectory};
pub use marketplace_database::{MarketplaceDatabase, MarketplaceError};
