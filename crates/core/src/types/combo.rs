//! Combo offers: bundles of catalog products sold at a special price.
//!
//! A combo is either `normal` (a flat list of products, the buyer picks
//! `selectable_quantity` of them) or `categorized` (several groups, each with
//! its own pick limit). The two shapes are modelled as [`ComboSelection`], so a
//! combo can never carry both.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ComboOfferId;

/// Combo kind as exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComboType {
    Normal,
    Categorized,
}

impl ComboType {
    /// Parse a combo type, accepting the legacy `*Combo` spellings.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "normal" | "normalCombo" => Some(Self::Normal),
            "categorized" | "categorizedCombo" => Some(Self::Categorized),
            _ => None,
        }
    }

    /// Canonical string form (also the database value).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Categorized => "categorized",
        }
    }
}

impl std::fmt::Display for ComboType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One group of a categorized combo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboCategory {
    pub name: String,
    pub selectable_quantity: u32,
    pub product_ids: Vec<String>,
}

/// Which products a combo bundles and how many the buyer may pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "comboType", rename_all = "camelCase")]
pub enum ComboSelection {
    #[serde(rename_all = "camelCase")]
    Normal {
        #[serde(rename = "shopifyProductIds")]
        product_ids: Vec<String>,
        selectable_quantity: u32,
    },
    #[serde(rename_all = "camelCase")]
    Categorized { categories: Vec<ComboCategory> },
}

impl ComboSelection {
    #[must_use]
    pub const fn combo_type(&self) -> ComboType {
        match self {
            Self::Normal { .. } => ComboType::Normal,
            Self::Categorized { .. } => ComboType::Categorized,
        }
    }

    /// Every distinct product referenced by the combo, in first-seen order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<&str> {
        let all: Box<dyn Iterator<Item = &String>> = match self {
            Self::Normal { product_ids, .. } => Box::new(product_ids.iter()),
            Self::Categorized { categories } => {
                Box::new(categories.iter().flat_map(|c| c.product_ids.iter()))
            }
        };

        let mut seen = HashSet::new();
        all.map(String::as_str).filter(|id| seen.insert(*id)).collect()
    }
}

/// The synthetic Shopify product created to give a combo a purchasable SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeProduct {
    #[serde(rename = "shopifyComboProductId")]
    pub product_id: String,
    #[serde(rename = "comboVariantId")]
    pub variant_id: String,
}

/// A persisted combo offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboOffer {
    pub id: ComboOfferId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub combo_price: Decimal,
    #[serde(rename = "comboImg", default, skip_serializing_if = "Option::is_none")]
    pub combo_image_url: Option<String>,
    #[serde(flatten)]
    pub selection: ComboSelection,
    pub is_synthetic: bool,
    #[serde(flatten)]
    pub representative: RepresentativeProduct,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ComboOffer {
    #[must_use]
    pub const fn combo_type(&self) -> ComboType {
        self.selection.combo_type()
    }

    /// Summary attached to bundled products as a Shopify metafield.
    #[must_use]
    pub fn summary(&self) -> ComboSummary<'_> {
        match &self.selection {
            ComboSelection::Normal {
                product_ids,
                selectable_quantity,
            } => ComboSummary {
                name: &self.name,
                combo_price: self.combo_price,
                product_ids: Some(product_ids),
                selectable_quantity: Some(*selectable_quantity),
                categories: None,
            },
            ComboSelection::Categorized { categories } => ComboSummary {
                name: &self.name,
                combo_price: self.combo_price,
                product_ids: None,
                selectable_quantity: None,
                categories: Some(categories),
            },
        }
    }
}

/// JSON summary of a combo, shaped per combo type.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboSummary<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<&'a [String]>,
    #[serde(with = "rust_decimal::serde::float")]
    pub combo_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectable_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<&'a [ComboCategory]>,
}

/// A combo offer ready to be persisted; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComboOffer {
    pub name: String,
    pub combo_price: Decimal,
    pub combo_image_url: Option<String>,
    pub selection: ComboSelection,
    pub representative: RepresentativeProduct,
}

impl NewComboOffer {
    /// Materialize the offer with its store-assigned identity.
    #[must_use]
    pub fn into_offer(self, id: ComboOfferId, created_at: DateTime<Utc>) -> ComboOffer {
        ComboOffer {
            id,
            name: self.name,
            combo_price: self.combo_price,
            combo_image_url: self.combo_image_url,
            selection: self.selection,
            is_synthetic: true,
            representative: self.representative,
            is_active: true,
            created_at,
        }
    }
}
