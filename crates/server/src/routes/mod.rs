//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Health check (defined in main)
//! POST /webhooks-filtered  - Shopify product-update webhook intake
//! ```

pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the application routes.
pub fn routes() -> Router<AppState> {
    webhooks::router()
}
