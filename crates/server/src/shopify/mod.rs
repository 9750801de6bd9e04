//! Shopify Admin REST API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **CRITICAL: This module holds the high-privilege Admin API access token.**
//!
//! The token can create and delete products and write metafields on the
//! whole store. It is sent as the `X-Shopify-Access-Token` header and never
//! logged.
//!
//! # Architecture
//!
//! - [`RemoteCatalog`] is the seam the workflows depend on
//! - [`ShopifyClient`] implements it over the REST endpoints with `reqwest`
//! - No pagination: `list_products` returns the first page Shopify sends
//! - No retries: a 429 surfaces as [`ShopifyError::RateLimited`]
//!
//! # Example
//!
//! ```rust,ignore
//! use combo_offers_server::shopify::{RemoteCatalog, ShopifyClient};
//!
//! let client = ShopifyClient::new(&config.shopify)?;
//!
//! let products = client.list_products().await?;
//! let combo = client.create_product("Breakfast Box", dec!(25.00)).await?;
//! client.delete_product(&combo.product_id).await?;
//! ```

mod client;
pub mod types;

pub use client::ShopifyClient;
pub use types::*;

use async_trait::async_trait;
use combo_offers_core::RepresentativeProduct;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Access token rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Product ID is not a numeric Shopify ID.
    #[error("Invalid product ID: {0}")]
    InvalidProductId(String),
}

/// The remote product catalog the workflows talk to.
///
/// Implemented by [`ShopifyClient`] in production and by fakes in tests.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Fetch the store's products (first page only).
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ShopifyError>;

    /// Create a hidden combo product with a single variant at `price`.
    async fn create_product(
        &self,
        title: &str,
        price: Decimal,
    ) -> Result<RepresentativeProduct, ShopifyError>;

    /// Delete a product by its numeric ID.
    async fn delete_product(&self, product_id: &str) -> Result<(), ShopifyError>;

    /// Attach a JSON metafield to a product.
    async fn create_metafield(
        &self,
        product_id: &str,
        metafield: &MetafieldInput,
    ) -> Result<(), ShopifyError>;
}
