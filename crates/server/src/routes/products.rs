//! Product sync and listing handlers.

use axum::{Json, Router, extract::State, routing::get};
use combo_offers_core::Product;
use serde::Serialize;

use crate::{error::AppError, state::AppState};

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sync-products", get(sync_products))
        .route("/api/products", get(list_products))
}

/// Response for a completed sync.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: &'static str,
    pub synced: usize,
}

/// Mirror every Shopify product into the local catalog.
///
/// # Errors
///
/// Returns 500 if Shopify or the database fails.
pub async fn sync_products(State(state): State<AppState>) -> Result<Json<SyncResponse>, AppError> {
    let summary = state.sync().sync_products().await?;

    Ok(Json(SyncResponse {
        success: true,
        message: "Products synced successfully",
        synced: summary.synced,
    }))
}

/// List mirrored products as a bare JSON array.
///
/// # Errors
///
/// Returns 500 if the database fails.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.store().list_products().await?;
    Ok(Json(products))
}
