//! AgroLink Marketplace Engine
//!
//! The AgroLink engine contains the core logic for a producer–consumer agricultural marketplace:
//! identity, catalog, locations, the order lifecycle state machine with stock reservation and
//! compensation, the payment ledger and post-delivery ratings. It is server-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should
//!    never need to access the database directly. Instead, use the public API provided by the
//!    engine. The exception is the data types used in the database, which are defined in the
//!    [`db_types`] module and are public.
//! 2. The engine public API ([`mod@api`]). This provides the public-facing functionality of the
//!    marketplace: registering and authenticating users, managing products and locations, placing
//!    and moving orders through their lifecycle, recording payments and ratings. Backends implement
//!    the traits in the [`traits`] module in order to serve the AgroLink server.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted
//! when an order is created or changes state. A simple actor framework is used so that you can
//! hook into these events (the server uses it for best-effort mail notification).
pub mod api;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod password;
pub mod traits;

pub mod order_objects;
pub mod test_utils;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{CatalogApi, IdentityApi, LocationApi, OrderFlowApi, PaymentApi, RatingApi, RegisterUser};
pub use order_objects::{
    ContactInfo,
    EnrichedOrder,
    OrderQueryFilter,
    OrderWithItems,
    ProductCard,
    ProductListing,
    ProductQueryFilter,
    ProducerPublic,
    RatingSummary,
};
pub use traits::{
    CatalogApiError,
    CatalogManagement,
    IdentityApiError,
    IdentityManagement,
    LocationApiError,
    LocationDirectory,
    MarketplaceDatabase,
    MarketplaceError,
};
