//! Catalog products mirrored from Shopify.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product known locally.
///
/// Keyed by the Shopify product ID (`external_id`). Rows are written by the
/// catalog sync and, for representative products, by combo creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Shopify product ID (numeric, as a string).
    pub external_id: String,
    /// Product title.
    pub title: String,
    /// Price of the first variant.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// URL slug.
    pub handle: String,
    /// First image URL, empty when the remote product has no image.
    pub image: Option<String>,
    /// True when the product only exists to back a combo offer.
    pub is_synthetic: bool,
}

/// A partial product update used for upserts.
///
/// `None` fields are left untouched on an existing row and fall back to
/// defaults when the row is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub handle: Option<String>,
    pub image: Option<String>,
    pub is_synthetic: Option<bool>,
}

impl ProductPatch {
    /// Patch that only flags the product as a combo representative.
    #[must_use]
    pub fn synthetic() -> Self {
        Self {
            is_synthetic: Some(true),
            ..Self::default()
        }
    }

    /// Apply the patch to an existing product.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(handle) = &self.handle {
            product.handle.clone_from(handle);
        }
        if let Some(image) = &self.image {
            product.image = Some(image.clone());
        }
        if let Some(is_synthetic) = self.is_synthetic {
            product.is_synthetic = is_synthetic;
        }
    }

    /// Build a new product from the patch, defaulting missing fields.
    #[must_use]
    pub fn into_product(self, external_id: impl Into<String>) -> Product {
        Product {
            external_id: external_id.into(),
            title: self.title.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            handle: self.handle.unwrap_or_default(),
            image: self.image,
            is_synthetic: self.is_synthetic.unwrap_or(false),
        }
    }
}
