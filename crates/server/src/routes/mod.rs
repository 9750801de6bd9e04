//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//!
//! # Products
//! GET    /api/sync-products               - Mirror Shopify products locally
//! GET    /api/products                    - List mirrored products
//!
//! # Combo offers
//! GET    /api/combo-offers                - List combo offers
//! POST   /api/combo-offers                - Create a combo offer
//! DELETE /api/combo-offers-delete/{id}    - Delete a combo offer
//! ```

pub mod combos;
pub mod products;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(products::router())
        .merge(combos::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
