//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CatalogStore;
use crate::services::{ComboService, SyncService};
use crate::shopify::RemoteCatalog;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    remote: Arc<dyn RemoteCatalog>,
    store: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Build state from the remote catalog and the store.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteCatalog>, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { remote, store }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }

    /// Product sync workflow.
    #[must_use]
    pub fn sync(&self) -> SyncService {
        SyncService::new(Arc::clone(&self.inner.remote), Arc::clone(&self.inner.store))
    }

    /// Combo offer workflows.
    #[must_use]
    pub fn combos(&self) -> ComboService {
        ComboService::new(Arc::clone(&self.inner.remote), Arc::clone(&self.inner.store))
    }
}
