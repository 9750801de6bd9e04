//! Combo offer creation and deletion.
//!
//! Creating a combo touches three systems in order: a representative product
//! is created in Shopify, the combo is persisted, then every bundled product
//! gets a metafield describing the combo. Only the first two steps are fatal.

use std::sync::Arc;

use combo_offers_core::{
    ComboDraft, ComboOffer, ComboOfferId, CreateComboRequest, ProductPatch,
};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::db::CatalogStore;
use crate::error::AppError;
use crate::shopify::{COMBO_METAFIELD_NAMESPACE, MetafieldInput, RemoteCatalog};

/// Result of attaching the combo metafield to one bundled product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldOutcome {
    pub product_id: String,
    pub attached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetafieldOutcome {
    fn attached(product_id: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            attached: true,
            error: None,
        }
    }

    fn failed(product_id: &str, reason: impl Into<String>) -> Self {
        Self {
            product_id: product_id.to_string(),
            attached: false,
            error: Some(reason.into()),
        }
    }
}

/// A persisted combo and the per-product metafield results.
#[derive(Debug, Clone)]
pub struct ComboCreated {
    pub combo: ComboOffer,
    pub metafields: Vec<MetafieldOutcome>,
}

/// A removed combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboDeleted {
    pub id: ComboOfferId,
    /// Whether the representative Shopify product was removed too.
    pub remote_product_deleted: bool,
}

/// Combo offer workflows over a remote catalog and a store.
#[derive(Clone)]
pub struct ComboService {
    remote: Arc<dyn RemoteCatalog>,
    store: Arc<dyn CatalogStore>,
}

impl ComboService {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteCatalog>, store: Arc<dyn CatalogStore>) -> Self {
        Self { remote, store }
    }

    /// Validate a request, create the representative Shopify product, persist
    /// the combo and attach metafields to the bundled products.
    ///
    /// If persisting fails the representative product is deleted again on a
    /// best-effort basis. Metafield failures are reported per product and
    /// never fail the call.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the request does not describe a valid combo
    /// - `RemoteUnavailable` if the representative product cannot be created
    /// - `StoreFailure` if the combo or the synthetic product flag cannot be saved
    #[instrument(skip(self, request), fields(combo_type = ?request.combo_type))]
    pub async fn create_combo(&self, request: CreateComboRequest) -> Result<ComboCreated, AppError> {
        let draft = ComboDraft::try_from(request)?;

        let representative = self
            .remote
            .create_product(&draft.name, draft.combo_price)
            .await?;

        let combo = match self
            .store
            .create_combo_offer(draft.into_new_offer(representative.clone()))
            .await
        {
            Ok(combo) => combo,
            Err(err) => {
                self.discard_remote_product(&representative.product_id).await;
                return Err(AppError::StoreFailure(err));
            }
        };

        self.store
            .upsert_product(&combo.representative.product_id, &ProductPatch::synthetic())
            .await
            .map_err(AppError::StoreFailure)?;

        let metafields = self.attach_metafields(&combo).await;

        info!(
            combo_id = %combo.id,
            combo_type = %combo.combo_type(),
            shopify_product_id = %combo.representative.product_id,
            metafields = metafields.len(),
            "Created combo offer"
        );

        Ok(ComboCreated { combo, metafields })
    }

    /// Delete a combo and, best-effort, its representative Shopify product.
    ///
    /// IDs that do not parse are treated like unknown combos.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no combo has this ID
    /// - `StoreFailure` if the lookup or delete fails
    #[instrument(skip(self))]
    pub async fn delete_combo(&self, id: &str) -> Result<ComboDeleted, AppError> {
        let id = ComboOfferId::parse(id)
            .ok_or_else(|| AppError::NotFound("Combo offer not found".to_string()))?;

        let combo = self.store.get_combo_offer(id).await?;

        let product_id = combo.representative.product_id.as_str();
        let remote_product_deleted = if product_id.is_empty() {
            false
        } else {
            match self.remote.delete_product(product_id).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(combo_id = %id, shopify_product_id = %product_id, error = %e, "Failed to delete Shopify combo product");
                    false
                }
            }
        };

        self.store.delete_combo_offer(id).await?;

        info!(combo_id = %id, remote_product_deleted, "Deleted combo offer");
        Ok(ComboDeleted {
            id,
            remote_product_deleted,
        })
    }

    async fn discard_remote_product(&self, product_id: &str) {
        if let Err(e) = self.remote.delete_product(product_id).await {
            warn!(shopify_product_id = %product_id, error = %e, "Failed to remove orphaned Shopify combo product");
        }
    }

    /// Attach the combo summary to every distinct bundled product, concurrently.
    async fn attach_metafields(&self, combo: &ComboOffer) -> Vec<MetafieldOutcome> {
        let product_ids = combo.selection.product_ids();

        let value = match serde_json::to_string(&combo.summary()) {
            Ok(value) => value,
            Err(e) => {
                warn!(combo_id = %combo.id, error = %e, "Failed to encode combo metafield");
                return product_ids
                    .into_iter()
                    .map(|id| MetafieldOutcome::failed(id, e.to_string()))
                    .collect();
            }
        };

        let metafield = MetafieldInput {
            namespace: COMBO_METAFIELD_NAMESPACE.to_string(),
            key: combo.id.to_string(),
            value,
        };

        join_all(product_ids.into_iter().map(|product_id| {
            let metafield = &metafield;
            async move {
                match self.remote.create_metafield(product_id, metafield).await {
                    Ok(()) => MetafieldOutcome::attached(product_id),
                    Err(e) => {
                        warn!(combo_id = %combo.id, product_id, error = %e, "Failed to attach combo metafield");
                        MetafieldOutcome::failed(product_id, e.to_string())
                    }
                }
            }
        }))
        .await
    }
}
