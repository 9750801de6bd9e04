//! In-process catalog store.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use combo_offers_core::{ComboOffer, ComboOfferId, NewComboOffer, Product, ProductPatch};

use super::{CatalogStore, RepositoryError};

/// Catalog store kept in memory, with the same semantics as
/// [`PgCatalogStore`](super::PgCatalogStore).
///
/// Vectors keep insertion order, which is also the listing order.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
    combos: RwLock<Vec<ComboOffer>>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn upsert_product(
        &self,
        external_id: &str,
        patch: &ProductPatch,
    ) -> Result<(), RepositoryError> {
        let mut products = self.products.write().unwrap_or_else(PoisonError::into_inner);

        match products.iter_mut().find(|p| p.external_id == external_id) {
            Some(existing) => patch.apply_to(existing),
            None => products.push(patch.clone().into_product(external_id)),
        }
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn list_combo_offers(&self) -> Result<Vec<ComboOffer>, RepositoryError> {
        Ok(self
            .combos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn get_combo_offer(&self, id: ComboOfferId) -> Result<ComboOffer, RepositoryError> {
        self.combos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_combo_offer(&self, offer: NewComboOffer) -> Result<ComboOffer, RepositoryError> {
        let combo = offer.into_offer(ComboOfferId::generate(), Utc::now());
        self.combos
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(combo.clone());
        Ok(combo)
    }

    async fn delete_combo_offer(&self, id: ComboOfferId) -> Result<(), RepositoryError> {
        let mut combos = self.combos.write().unwrap_or_else(PoisonError::into_inner);
        let position = combos
            .iter()
            .position(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        combos.remove(position);
        Ok(())
    }
}
