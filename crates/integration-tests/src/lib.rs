//! Integration tests for the combo offers backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p combo-offers-integration-tests
//! ```
//!
//! The full axum router is driven in-process with `tower::ServiceExt::oneshot`
//! against [`MemoryCatalogStore`] and [`FakeShopify`], so no database or
//! network access is needed.
//!
//! # Test Categories
//!
//! - `catalog_api` - Product sync and listing
//! - `combo_offers_api` - Combo creation, listing and deletion

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use combo_offers_core::RepresentativeProduct;
use combo_offers_server::db::{CatalogStore, MemoryCatalogStore};
use combo_offers_server::shopify::{
    MetafieldInput, RemoteCatalog, RemoteImage, RemoteProduct, RemoteVariant, ShopifyError,
};
use combo_offers_server::state::AppState;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

/// First ID handed out for created combo products.
pub const FIRST_COMBO_PRODUCT_ID: u64 = 8_000_000_001;

/// In-memory stand-in for the Shopify Admin API.
#[derive(Default)]
pub struct FakeShopify {
    state: Mutex<FakeShopifyState>,
}

#[derive(Default)]
struct FakeShopifyState {
    products: Vec<RemoteProduct>,
    next_id: u64,
    fail_list: bool,
    fail_create: bool,
    fail_delete: bool,
    fail_metafields_for: Vec<String>,
    deleted: Vec<String>,
    metafields: Vec<(String, MetafieldInput)>,
}

fn service_unavailable() -> ShopifyError {
    ShopifyError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

impl FakeShopify {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog product with one variant and one image.
    pub fn add_product(&self, id: u64, title: &str, price: &str) {
        self.state.lock().unwrap().products.push(RemoteProduct {
            id,
            title: title.to_string(),
            handle: title.to_lowercase().replace(' ', "-"),
            variants: vec![RemoteVariant {
                id: id * 10,
                price: price.parse::<Decimal>().unwrap(),
            }],
            images: vec![RemoteImage {
                src: format!("https://cdn.shopify.com/s/files/{id}.png"),
            }],
        });
    }

    pub fn fail_list(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    pub fn fail_create(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    pub fn fail_metafields_for(&self, product_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_metafields_for
            .push(product_id.to_string());
    }

    /// Product IDs passed to `delete_product`, including failed attempts.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// Successfully attached metafields as `(product_id, metafield)`.
    #[must_use]
    pub fn metafields(&self) -> Vec<(String, MetafieldInput)> {
        self.state.lock().unwrap().metafields.clone()
    }

    /// Number of products currently in the fake store.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.state.lock().unwrap().products.len()
    }
}

#[async_trait]
impl RemoteCatalog for FakeShopify {
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ShopifyError> {
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(service_unavailable());
        }
        Ok(state.products.clone())
    }

    async fn create_product(
        &self,
        title: &str,
        price: Decimal,
    ) -> Result<RepresentativeProduct, ShopifyError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(service_unavailable());
        }

        let id = FIRST_COMBO_PRODUCT_ID + state.next_id;
        state.next_id += 1;
        state.products.push(RemoteProduct {
            id,
            title: title.to_string(),
            handle: title.to_lowercase().replace(' ', "-"),
            variants: vec![RemoteVariant { id: id * 10, price }],
            images: Vec::new(),
        });

        Ok(RepresentativeProduct {
            product_id: id.to_string(),
            variant_id: (id * 10).to_string(),
        })
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), ShopifyError> {
        let mut state = self.state.lock().unwrap();
        state.deleted.push(product_id.to_string());
        if state.fail_delete {
            return Err(service_unavailable());
        }
        state.products.retain(|p| p.id.to_string() != product_id);
        Ok(())
    }

    async fn create_metafield(
        &self,
        product_id: &str,
        metafield: &MetafieldInput,
    ) -> Result<(), ShopifyError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_metafields_for.iter().any(|id| id == product_id) {
            return Err(service_unavailable());
        }
        state
            .metafields
            .push((product_id.to_string(), metafield.clone()));
        Ok(())
    }
}

/// Router plus handles on its collaborators.
pub struct TestContext {
    pub app: Router,
    pub shopify: Arc<FakeShopify>,
    pub store: Arc<MemoryCatalogStore>,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shopify(FakeShopify::new())
    }

    #[must_use]
    pub fn with_shopify(shopify: FakeShopify) -> Self {
        Self::with_collaborators(Arc::new(shopify), Arc::new(MemoryCatalogStore::new()))
    }

    /// Build the router around a store that may not be a [`MemoryCatalogStore`].
    #[must_use]
    pub fn router_with_store(shopify: Arc<FakeShopify>, store: Arc<dyn CatalogStore>) -> Router {
        combo_offers_server::app(AppState::new(shopify, store), None)
    }

    fn with_collaborators(shopify: Arc<FakeShopify>, store: Arc<MemoryCatalogStore>) -> Self {
        let state = AppState::new(shopify.clone(), store.clone());
        Self {
            app: combo_offers_server::app(state, None),
            shopify,
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        send(&self.app, Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        send(&self.app, Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Method::DELETE, uri, None).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one request through the router and decode the JSON response.
///
/// Non-JSON bodies are returned as a JSON string.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map_or_else(Body::empty, Body::from))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}
