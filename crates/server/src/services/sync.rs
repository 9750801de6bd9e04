//! Product sync from Shopify into the local catalog.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{info, instrument};

use crate::db::CatalogStore;
use crate::error::AppError;
use crate::shopify::RemoteCatalog;

/// Result of a completed sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Number of products upserted.
    pub synced: usize,
}

/// Copies the remote product list into the store.
#[derive(Clone)]
pub struct SyncService {
    remote: Arc<dyn RemoteCatalog>,
    store: Arc<dyn CatalogStore>,
}

impl SyncService {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteCatalog>, store: Arc<dyn CatalogStore>) -> Self {
        Self { remote, store }
    }

    /// Fetch every product Shopify returns and upsert it locally.
    ///
    /// Upserts run concurrently. The first failing upsert aborts the sync;
    /// upserts that already completed are kept.
    ///
    /// # Errors
    ///
    /// Returns `RemoteUnavailable` if the product list cannot be fetched and
    /// `StoreFailure` if any upsert fails.
    #[instrument(skip(self))]
    pub async fn sync_products(&self) -> Result<SyncSummary, AppError> {
        let products = self.remote.list_products().await?;

        let patches: Vec<_> = products
            .iter()
            .map(|product| (product.external_id(), product.to_patch()))
            .collect();

        try_join_all(
            patches
                .iter()
                .map(|(external_id, patch)| self.store.upsert_product(external_id, patch)),
        )
        .await
        .map_err(AppError::StoreFailure)?;

        let summary = SyncSummary {
            synced: patches.len(),
        };
        info!(synced = summary.synced, "Synced Shopify products");
        Ok(summary)
    }
}
