//! Hand-written collaborators for workflow tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use async_trait::async_trait;
use combo_offers_core::{ComboOffer, ComboOfferId, NewComboOffer, Product, ProductPatch, RepresentativeProduct};
use rust_decimal::Decimal;

use crate::db::{CatalogStore, MemoryCatalogStore, RepositoryError};
use crate::shopify::{MetafieldInput, RemoteCatalog, RemoteImage, RemoteProduct, RemoteVariant, ShopifyError};

/// Build a remote product with one variant and one image.
pub fn remote_product(id: u64, title: &str, price: &str) -> RemoteProduct {
    RemoteProduct {
        id,
        title: title.to_string(),
        handle: title.to_lowercase().replace(' ', "-"),
        variants: vec![RemoteVariant {
            id: id + 1000,
            price: price.parse::<Decimal>().unwrap(),
        }],
        images: vec![RemoteImage {
            src: format!("https://cdn.example.com/{id}.png"),
        }],
    }
}

fn unavailable() -> ShopifyError {
    ShopifyError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

/// Remote catalog that records calls and fails on request.
#[derive(Default)]
pub struct FakeRemote {
    pub products: Vec<RemoteProduct>,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_delete: bool,
    /// Product IDs whose metafield calls fail.
    pub fail_metafields_for: Vec<String>,
    pub created: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub metafields: Mutex<Vec<(String, MetafieldInput)>>,
}

impl FakeRemote {
    pub fn with_products(products: Vec<RemoteProduct>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn metafields(&self) -> Vec<(String, MetafieldInput)> {
        self.metafields.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteCatalog for FakeRemote {
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ShopifyError> {
        if self.fail_list {
            return Err(unavailable());
        }
        Ok(self.products.clone())
    }

    async fn create_product(
        &self,
        title: &str,
        _price: Decimal,
    ) -> Result<RepresentativeProduct, ShopifyError> {
        if self.fail_create {
            return Err(unavailable());
        }
        let mut created = self.created.lock().unwrap();
        created.push(title.to_string());
        let n = created.len();
        Ok(RepresentativeProduct {
            product_id: format!("900{n}"),
            variant_id: format!("910{n}"),
        })
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), ShopifyError> {
        self.deleted.lock().unwrap().push(product_id.to_string());
        if self.fail_delete {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn create_metafield(
        &self,
        product_id: &str,
        metafield: &MetafieldInput,
    ) -> Result<(), ShopifyError> {
        if self.fail_metafields_for.iter().any(|id| id == product_id) {
            return Err(unavailable());
        }
        self.metafields
            .lock()
            .unwrap()
            .push((product_id.to_string(), metafield.clone()));
        Ok(())
    }
}

/// Memory store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryCatalogStore,
    pub fail_upsert: bool,
    pub fail_create: bool,
}

fn store_down() -> RepositoryError {
    RepositoryError::DataCorruption("store unavailable".to_string())
}

#[async_trait]
impl CatalogStore for FlakyStore {
    async fn upsert_product(
        &self,
        external_id: &str,
        patch: &ProductPatch,
    ) -> Result<(), RepositoryError> {
        if self.fail_upsert {
            return Err(store_down());
        }
        self.inner.upsert_product(external_id, patch).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.inner.list_products().await
    }

    async fn list_combo_offers(&self) -> Result<Vec<ComboOffer>, RepositoryError> {
        self.inner.list_combo_offers().await
    }

    async fn get_combo_offer(&self, id: ComboOfferId) -> Result<ComboOffer, RepositoryError> {
        self.inner.get_combo_offer(id).await
    }

    async fn create_combo_offer(&self, offer: NewComboOffer) -> Result<ComboOffer, RepositoryError> {
        if self.fail_create {
            return Err(store_down());
        }
        self.inner.create_combo_offer(offer).await
    }

    async fn delete_combo_offer(&self, id: ComboOfferId) -> Result<(), RepositoryError> {
        self.inner.delete_combo_offer(id).await
    }
}
