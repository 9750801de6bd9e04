//! Inbound combo creation requests and their validation.
//!
//! The HTTP body is accepted loosely as [`CreateComboRequest`] and converted
//! into a [`ComboDraft`] before anything touches Shopify or the database.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::combo::{ComboCategory, ComboSelection, ComboType, NewComboOffer, RepresentativeProduct};

/// Reasons a combo request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComboRequestError {
    #[error("Invalid combo type.")]
    MissingComboType,
    #[error("Invalid combo type: {0}")]
    UnknownComboType(String),
    #[error("combo name must not be empty")]
    BlankName,
    #[error("comboPrice is required")]
    MissingPrice,
    #[error("comboPrice must not be negative")]
    NegativePrice,
    #[error("comboPrice must have at most 2 decimal places")]
    PriceTooPrecise,
    #[error("comboPrice must be less than 10000000000")]
    PriceTooLarge,
    #[error("productIds must contain at least one product")]
    MissingProductIds,
    #[error("selectableQuantity is required for normal combos")]
    MissingSelectableQuantity,
    #[error("selectableQuantity must be between 1 and {available} (got {quantity})")]
    SelectableQuantityOutOfRange { quantity: i64, available: usize },
    #[error("categories must contain at least one category")]
    MissingCategories,
    #[error("category '{0}' has no products")]
    EmptyCategory(String),
    #[error("category '{category}' selectableQuantity must be between 1 and {available} (got {quantity})")]
    CategoryQuantityOutOfRange {
        category: String,
        quantity: i64,
        available: usize,
    },
}

/// Decimal places a stored price can hold (`NUMERIC(12, 2)`).
const MAX_PRICE_SCALE: u32 = 2;

/// Exclusive upper bound of a stored price (`NUMERIC(12, 2)`).
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Raw combo creation body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComboRequest {
    #[serde(default)]
    pub name: String,
    pub product_ids: Option<Vec<String>>,
    pub combo_price: Option<Decimal>,
    pub selectable_quantity: Option<i64>,
    pub combo_img: Option<String>,
    pub categories: Option<Vec<CategoryRequest>>,
    pub combo_type: Option<String>,
}

/// Raw category entry of a categorized combo body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    pub selectable_quantity: Option<i64>,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

/// A validated combo, not yet backed by a Shopify product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboDraft {
    pub name: String,
    pub combo_price: Decimal,
    pub combo_image_url: Option<String>,
    pub selection: ComboSelection,
}

impl ComboDraft {
    /// Attach the representative Shopify product, producing a storable offer.
    #[must_use]
    pub fn into_new_offer(self, representative: RepresentativeProduct) -> NewComboOffer {
        NewComboOffer {
            name: self.name,
            combo_price: self.combo_price,
            combo_image_url: self.combo_image_url,
            selection: self.selection,
            representative,
        }
    }
}

impl TryFrom<CreateComboRequest> for ComboDraft {
    type Error = ComboRequestError;

    fn try_from(req: CreateComboRequest) -> Result<Self, Self::Error> {
        // Combo type first: an unknown type is rejected regardless of the rest.
        let raw_type = req.combo_type.ok_or(ComboRequestError::MissingComboType)?;
        let combo_type = ComboType::parse(&raw_type)
            .ok_or(ComboRequestError::UnknownComboType(raw_type))?;

        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(ComboRequestError::BlankName);
        }

        let combo_price = req.combo_price.ok_or(ComboRequestError::MissingPrice)?;
        if combo_price.is_sign_negative() && !combo_price.is_zero() {
            return Err(ComboRequestError::NegativePrice);
        }
        // Trailing zeros do not count: "5.000" is stored as 5.00.
        if combo_price.normalize().scale() > MAX_PRICE_SCALE {
            return Err(ComboRequestError::PriceTooPrecise);
        }
        if combo_price >= Decimal::from(PRICE_LIMIT) {
            return Err(ComboRequestError::PriceTooLarge);
        }

        let selection = match combo_type {
            ComboType::Normal => {
                let product_ids = req
                    .product_ids
                    .filter(|ids| !ids.is_empty())
                    .ok_or(ComboRequestError::MissingProductIds)?;
                let quantity = req
                    .selectable_quantity
                    .ok_or(ComboRequestError::MissingSelectableQuantity)?;
                let selectable_quantity = checked_quantity(quantity, product_ids.len()).ok_or(
                    ComboRequestError::SelectableQuantityOutOfRange {
                        quantity,
                        available: product_ids.len(),
                    },
                )?;
                ComboSelection::Normal {
                    product_ids,
                    selectable_quantity,
                }
            }
            ComboType::Categorized => {
                let raw = req
                    .categories
                    .filter(|c| !c.is_empty())
                    .ok_or(ComboRequestError::MissingCategories)?;
                let categories = raw
                    .into_iter()
                    .map(validate_category)
                    .collect::<Result<Vec<_>, _>>()?;
                ComboSelection::Categorized { categories }
            }
        };

        let combo_image_url = req.combo_img.filter(|url| !url.trim().is_empty());

        Ok(Self {
            name,
            combo_price,
            combo_image_url,
            selection,
        })
    }
}

fn validate_category(raw: CategoryRequest) -> Result<ComboCategory, ComboRequestError> {
    if raw.product_ids.is_empty() {
        return Err(ComboRequestError::EmptyCategory(raw.name));
    }
    let available = raw.product_ids.len();
    // A category without an explicit limit lets the buyer pick one product.
    let quantity = raw.selectable_quantity.unwrap_or(1);
    let Some(selectable_quantity) = checked_quantity(quantity, available) else {
        return Err(ComboRequestError::CategoryQuantityOutOfRange {
            category: raw.name,
            quantity,
            available,
        });
    };
    Ok(ComboCategory {
        name: raw.name,
        selectable_quantity,
        product_ids: raw.product_ids,
    })
}

/// Returns the quantity when it lies in `1..=available`.
fn checked_quantity(quantity: i64, available: usize) -> Option<u32> {
    let q = u32::try_from(quantity).ok()?;
    (q >= 1 && usize::try_from(q).ok()? <= available).then_some(q)
}
