//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Liveness check
//! GET  /health/ready        - Readiness check (database ping)
//!
//! # API (rate limited)
//! POST /api/cart/validate   - Which cart items are still purchasable
//! POST /api/whatsapp/clicks - Record an inquiry button click
//! POST /api/views           - Record an item detail page view
//! ```

pub mod cart;
pub mod health;
pub mod tracking;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::api_rate_limiter;
use crate::state::AppState;

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/validate", post(cart::validate))
        .route("/whatsapp/clicks", post(tracking::record_click))
        .route("/views", post(tracking::record_view))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}
