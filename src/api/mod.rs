//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`stock_units`] - catalog stock units
//! - [`gift_cards`] - gift card issuance and lookup
//! - [`customers`] - customer CRUD and statistics
//! - [`segments`] - segment definitions and bulk recalculation
//! - [`orders`] - order aggregate operations
//! - [`reminders`] - reminder settings, history and the cron trigger
//!
//! Every tenant-scoped route resolves the tenant from the `X-Tenant-Id`
//! header via [`tenant::TenantContext`].

pub mod tenant;

pub mod customers;
pub mod gift_cards;
pub mod health;
pub mod orders;
pub mod reminders;
pub mod segments;
pub mod stock_units;

use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Compose the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(stock_units::router())
        .merge(gift_cards::router())
        .merge(customers::router())
        .merge(segments::router())
        .merge(orders::router())
        .merge(reminders::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(ConcurrencyLimitLayer::new(1024))
        .with_state(state)
}
