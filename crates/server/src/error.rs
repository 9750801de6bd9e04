//! Unified error handling for the combo offers API.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use combo_offers_core::ComboRequestError;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation or could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Shopify call failed.
    #[error("Shopify error: {0}")]
    RemoteUnavailable(#[from] ShopifyError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    StoreFailure(RepositoryError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Combo offer not found".to_string()),
            other => Self::StoreFailure(other),
        }
    }
}

impl From<ComboRequestError> for AppError {
    fn from(err: ComboRequestError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RemoteUnavailable(_) | Self::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::RemoteUnavailable(_) | Self::StoreFailure(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Combo offers request error"
            );
        }

        // Don't expose database details to clients
        let message = match &self {
            Self::StoreFailure(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({ "success": false, "message": message }));
        (self.status(), body).into_response()
    }
}
