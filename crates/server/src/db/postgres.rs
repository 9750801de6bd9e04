//! `PostgreSQL` catalog store.
//!
//! Queries use the runtime `sqlx::query_as` API so the crate builds without a
//! reachable database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use combo_offers_core::{
    ComboCategory, ComboOffer, ComboOfferId, ComboSelection, ComboType, NewComboOffer, Product,
    ProductPatch, RepresentativeProduct,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use super::{CatalogStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "external_id, title, price, handle, image, is_synthetic";

const COMBO_COLUMNS: &str = "id, name, combo_price, combo_image_url, combo_type, product_ids, \
     selectable_quantity, categories, is_synthetic, representative_product_id, \
     representative_variant_id, is_active, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    external_id: String,
    title: String,
    price: Decimal,
    handle: String,
    image: Option<String>,
    is_synthetic: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            external_id: row.external_id,
            title: row.title,
            price: row.price,
            handle: row.handle,
            image: row.image,
            is_synthetic: row.is_synthetic,
        }
    }
}

/// Internal row type for `PostgreSQL` combo offer queries.
#[derive(Debug, sqlx::FromRow)]
struct ComboOfferRow {
    id: ComboOfferId,
    name: String,
    combo_price: Decimal,
    combo_image_url: Option<String>,
    combo_type: String,
    product_ids: Option<Vec<String>>,
    selectable_quantity: Option<i32>,
    categories: Option<Json<Vec<ComboCategory>>>,
    is_synthetic: bool,
    representative_product_id: String,
    representative_variant_id: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ComboOfferRow> for ComboOffer {
    type Error = RepositoryError;

    fn try_from(row: ComboOfferRow) -> Result<Self, Self::Error> {
        let combo_type = ComboType::parse(&row.combo_type).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "combo {} has unknown combo_type '{}'",
                row.id, row.combo_type
            ))
        })?;

        let selection = match (combo_type, row.product_ids, row.selectable_quantity, row.categories) {
            (ComboType::Normal, Some(product_ids), Some(quantity), None) => {
                let selectable_quantity = u32::try_from(quantity).map_err(|_| {
                    RepositoryError::DataCorruption(format!(
                        "combo {} has negative selectable_quantity {quantity}",
                        row.id
                    ))
                })?;
                ComboSelection::Normal {
                    product_ids,
                    selectable_quantity,
                }
            }
            (ComboType::Categorized, None, None, Some(Json(categories))) => {
                ComboSelection::Categorized { categories }
            }
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "combo {} columns do not match combo_type '{combo_type}'",
                    row.id
                )));
            }
        };

        Ok(Self {
            id: row.id,
            name: row.name,
            combo_price: row.combo_price,
            combo_image_url: row.combo_image_url,
            selection,
            is_synthetic: row.is_synthetic,
            representative: RepresentativeProduct {
                product_id: row.representative_product_id,
                variant_id: row.representative_variant_id,
            },
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// Catalog store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn upsert_product(
        &self,
        external_id: &str,
        patch: &ProductPatch,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO products (external_id, title, price, handle, image, is_synthetic)
            VALUES ($1, COALESCE($2, ''), COALESCE($3, 0), COALESCE($4, ''), $5, COALESCE($6, FALSE))
            ON CONFLICT (external_id) DO UPDATE SET
                title = COALESCE($2, products.title),
                price = COALESCE($3, products.price),
                handle = COALESCE($4, products.handle),
                image = COALESCE($5, products.image),
                is_synthetic = COALESCE($6, products.is_synthetic),
                updated_at = NOW()
            ",
        )
        .bind(external_id)
        .bind(patch.title.as_deref())
        .bind(patch.price)
        .bind(patch.handle.as_deref())
        .bind(patch.image.as_deref())
        .bind(patch.is_synthetic)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn list_combo_offers(&self) -> Result<Vec<ComboOffer>, RepositoryError> {
        let rows = sqlx::query_as::<_, ComboOfferRow>(&format!(
            "SELECT {COMBO_COLUMNS} FROM combo_offers ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ComboOffer::try_from).collect()
    }

    async fn get_combo_offer(&self, id: ComboOfferId) -> Result<ComboOffer, RepositoryError> {
        let row = sqlx::query_as::<_, ComboOfferRow>(&format!(
            "SELECT {COMBO_COLUMNS} FROM combo_offers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        ComboOffer::try_from(row)
    }

    async fn create_combo_offer(&self, offer: NewComboOffer) -> Result<ComboOffer, RepositoryError> {
        let (product_ids, selectable_quantity, categories) = match &offer.selection {
            ComboSelection::Normal {
                product_ids,
                selectable_quantity,
            } => {
                let quantity = i32::try_from(*selectable_quantity).map_err(|_| {
                    RepositoryError::DataCorruption(format!(
                        "selectable_quantity {selectable_quantity} does not fit in INTEGER"
                    ))
                })?;
                (Some(product_ids), Some(quantity), None)
            }
            ComboSelection::Categorized { categories } => (None, None, Some(Json(categories))),
        };

        let row = sqlx::query_as::<_, ComboOfferRow>(&format!(
            r"
            INSERT INTO combo_offers (
                id, name, combo_price, combo_image_url, combo_type, product_ids,
                selectable_quantity, categories, representative_product_id,
                representative_variant_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COMBO_COLUMNS}
            "
        ))
        .bind(ComboOfferId::generate())
        .bind(&offer.name)
        .bind(offer.combo_price)
        .bind(offer.combo_image_url.as_deref())
        .bind(offer.selection.combo_type().as_str())
        .bind(product_ids)
        .bind(selectable_quantity)
        .bind(categories)
        .bind(&offer.representative.product_id)
        .bind(&offer.representative.variant_id)
        .fetch_one(&self.pool)
        .await?;

        ComboOffer::try_from(row)
    }

    async fn delete_combo_offer(&self, id: ComboOfferId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM combo_offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
