//! Shopify Admin REST client authenticated with a static access token.

use std::sync::Arc;

use async_trait::async_trait;
use combo_offers_core::RepresentativeProduct;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;

use super::types::{
    MetafieldInput, MetafieldPayload, NewProductPayload, ProductEnvelope, ProductsEnvelope,
    RemoteProduct,
};
use super::{RemoteCatalog, ShopifyError};

/// Maximum number of body characters kept in an API error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Shopify Admin REST API client.
///
/// Cheap to clone; the connection pool and credentials are shared.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    /// `https://{store}/admin/api/{version}`
    base_url: String,
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ShopifyClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let base_url = format!("https://{}/admin/api/{}", config.store, config.api_version);

        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| ShopifyError::Unauthorized(format!("Invalid access token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert("X-Shopify-Access-Token", token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                base_url,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ShopifyError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ShopifyError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Turn a non-success response into a `ShopifyError`.
    async fn parse_error(response: reqwest::Response) -> ShopifyError {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split('.').next())
                .and_then(|s| s.parse().ok())
                .unwrap_or(2);
            return ShopifyError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return ShopifyError::Unauthorized("Invalid or expired access token".to_string());
        }

        let body = response.text().await.unwrap_or_default();
        ShopifyError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        }
    }
}

/// Extract Shopify's `errors` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("errors").map(|e| match e {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
        .unwrap_or_else(|| body.to_string());

    message.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Shopify REST IDs are plain integers; anything else would escape the path.
fn checked_product_id(product_id: &str) -> Result<&str, ShopifyError> {
    if !product_id.is_empty() && product_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(product_id)
    } else {
        Err(ShopifyError::InvalidProductId(product_id.to_string()))
    }
}

#[async_trait]
impl RemoteCatalog for ShopifyClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ShopifyError> {
        let response = self
            .inner
            .client
            .get(self.url("/products.json"))
            .send()
            .await?;

        let envelope: ProductsEnvelope = Self::handle_response(response).await?;
        debug!(count = envelope.products.len(), "Fetched Shopify products");
        Ok(envelope.products)
    }

    #[instrument(skip(self), fields(price = %price))]
    async fn create_product(
        &self,
        title: &str,
        price: Decimal,
    ) -> Result<RepresentativeProduct, ShopifyError> {
        let payload = NewProductPayload::combo(title, price);

        let response = self
            .inner
            .client
            .post(self.url("/products.json"))
            .json(&payload)
            .send()
            .await?;

        let envelope: ProductEnvelope = Self::handle_response(response).await?;
        let product = envelope.product;
        let variant = product
            .variants
            .first()
            .ok_or_else(|| ShopifyError::Parse("created product has no variants".to_string()))?;

        debug!(product_id = product.id, variant_id = variant.id, "Created combo product");
        Ok(RepresentativeProduct {
            product_id: product.id.to_string(),
            variant_id: variant.id.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product_id: &str) -> Result<(), ShopifyError> {
        let product_id = checked_product_id(product_id)?;

        let response = self
            .inner
            .client
            .delete(self.url(&format!("/products/{product_id}.json")))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    #[instrument(skip(self, metafield), fields(key = %metafield.key))]
    async fn create_metafield(
        &self,
        product_id: &str,
        metafield: &MetafieldInput,
    ) -> Result<(), ShopifyError> {
        let product_id = checked_product_id(product_id)?;

        let response = self
            .inner
            .client
            .post(self.url(&format!("/products/{product_id}/metafields.json")))
            .json(&MetafieldPayload::from(metafield))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }
}
