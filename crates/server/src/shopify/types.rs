//! Request and response shapes for the Shopify Admin REST API.
//!
//! Only the fields this service reads or writes are modelled; everything else
//! in Shopify's payloads is ignored on deserialization.

use combo_offers_core::ProductPatch;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Namespace for combo metafields on bundled products.
pub const COMBO_METAFIELD_NAMESPACE: &str = "combo_offers";

/// Inventory assigned to a combo's representative variant.
pub const COMBO_INVENTORY_QUANTITY: i64 = 999;

/// Tags marking representative products so themes can hide them.
pub const COMBO_PRODUCT_TAGS: &[&str] = &["combo-offer", "combo-hidden"];

// =============================================================================
// Product Types
// =============================================================================

/// A product as returned by `GET /products.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteProduct {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub variants: Vec<RemoteVariant>,
    #[serde(default)]
    pub images: Vec<RemoteImage>,
}

/// A product variant. Shopify sends prices as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteVariant {
    pub id: u64,
    pub price: Decimal,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteImage {
    pub src: String,
}

impl RemoteProduct {
    /// The ID used as the local `external_id`.
    #[must_use]
    pub fn external_id(&self) -> String {
        self.id.to_string()
    }

    /// Map the remote fields onto a local product upsert.
    ///
    /// Uses the first variant's price and the first image. The synthetic flag
    /// is left untouched so a sync never un-marks a combo product.
    #[must_use]
    pub fn to_patch(&self) -> ProductPatch {
        ProductPatch {
            title: Some(self.title.clone()),
            price: Some(self.variants.first().map_or(Decimal::ZERO, |v| v.price)),
            handle: Some(self.handle.clone()),
            image: Some(self.images.first().map(|i| i.src.clone()).unwrap_or_default()),
            is_synthetic: None,
        }
    }
}

/// `{ "products": [...] }`
#[derive(Debug, Deserialize)]
pub(crate) struct ProductsEnvelope {
    pub products: Vec<RemoteProduct>,
}

/// `{ "product": {...} }`
#[derive(Debug, Deserialize)]
pub(crate) struct ProductEnvelope {
    pub product: RemoteProduct,
}

// =============================================================================
// Combo Product Creation
// =============================================================================

/// Body of `POST /products.json` for a combo's representative product.
#[derive(Debug, Serialize)]
pub(crate) struct NewProductPayload<'a> {
    pub product: NewProduct<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewProduct<'a> {
    pub title: &'a str,
    pub product_type: &'static str,
    pub status: &'static str,
    pub published_scope: &'static str,
    pub tags: &'static [&'static str],
    pub variants: [NewVariant; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct NewVariant {
    pub price: String,
    pub option1: &'static str,
    pub inventory_management: &'static str,
    pub inventory_quantity: i64,
}

impl<'a> NewProductPayload<'a> {
    /// Active, web-published combo product with one tracked variant.
    pub(crate) fn combo(title: &'a str, price: Decimal) -> Self {
        Self {
            product: NewProduct {
                title,
                product_type: "combo",
                status: "active",
                published_scope: "web",
                tags: COMBO_PRODUCT_TAGS,
                variants: [NewVariant {
                    price: price.to_string(),
                    option1: "Default Title",
                    inventory_management: "shopify",
                    inventory_quantity: COMBO_INVENTORY_QUANTITY,
                }],
            },
        }
    }
}

// =============================================================================
// Metafields
// =============================================================================

/// A JSON metafield to attach to a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldInput {
    pub namespace: String,
    pub key: String,
    /// JSON-encoded value.
    pub value: String,
}

/// Body of `POST /products/{id}/metafields.json`.
#[derive(Debug, Serialize)]
pub(crate) struct MetafieldPayload<'a> {
    pub metafield: MetafieldBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MetafieldBody<'a> {
    pub namespace: &'a str,
    pub key: &'a str,
    pub value: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl<'a> From<&'a MetafieldInput> for MetafieldPayload<'a> {
    fn from(input: &'a MetafieldInput) -> Self {
        Self {
            metafield: MetafieldBody {
                namespace: &input.namespace,
                key: &input.key,
                value: &input.value,
                kind: "json",
            },
        }
    }
}
