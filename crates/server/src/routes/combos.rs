//! Combo offer handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get},
};
use combo_offers_core::{ComboOffer, CreateComboRequest};
use serde::Serialize;

use crate::{error::AppError, services::MetafieldOutcome, state::AppState};

/// Build the combo offers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/combo-offers",
            get(list_combo_offers).post(create_combo_offer),
        )
        .route("/api/combo-offers-delete/{id}", delete(delete_combo_offer))
}

/// Response wrapping the combo list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboOffersResponse {
    pub combo_offers: Vec<ComboOffer>,
}

/// Response for a created combo.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub combo: ComboOffer,
    pub metafields: Vec<MetafieldOutcome>,
}

/// Response for a deleted combo.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub remote_product_deleted: bool,
}

/// List every combo offer.
///
/// # Errors
///
/// Returns 500 if the database fails.
pub async fn list_combo_offers(
    State(state): State<AppState>,
) -> Result<Json<ComboOffersResponse>, AppError> {
    let combo_offers = state.store().list_combo_offers().await?;
    Ok(Json(ComboOffersResponse { combo_offers }))
}

/// Create a combo offer.
///
/// Malformed JSON is reported as 400 like any other invalid input.
///
/// # Errors
///
/// Returns 400 for invalid input and 500 if Shopify or the database fails.
pub async fn create_combo_offer(
    State(state): State<AppState>,
    body: Result<Json<CreateComboRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(request) = body?;
    let created = state.combos().create_combo(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            combo: created.combo,
            metafields: created.metafields,
        }),
    ))
}

/// Delete a combo offer and its Shopify product.
///
/// # Errors
///
/// Returns 404 if the combo does not exist and 500 if the database fails.
pub async fn delete_combo_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state.combos().delete_combo(&id).await?;

    Ok(Json(DeletedResponse {
        success: true,
        message: "Combo offer deleted",
        remote_product_deleted: deleted.remote_product_deleted,
    }))
}
