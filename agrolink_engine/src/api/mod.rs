//! The engine public API.
//!
//! Each API is a thin generic facade over a backend trait. Handlers in the server hold these in
//! `web::Data` and call through; endpoint tests swap the backend for a mock.
mod catalog_api;
mod identity_api;
mod location_api;
mod order_flow_api;
mod payment_api;
mod rating_api;

pub use catalog_api::CatalogApi;
pub use identity_api::{IdentityApi, RegisterUser};
pub use location_api::LocationApi;
pub use order_flow_api::OrderFlowApi;
pub use payment_api::PaymentApi;
pub use rating_api::RatingApi;
