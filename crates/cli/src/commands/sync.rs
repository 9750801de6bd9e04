//! One-off product sync.
//!
//! # Usage
//!
//! ```bash
//! combo-cli sync
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SHOPIFY_STORE` - Shopify store domain
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token
//! - `SHOPIFY_API_VERSION` - Admin REST API version (default: 2024-01)

use std::sync::Arc;

use combo_offers_server::config::ShopifyConfig;
use combo_offers_server::db::{self, PgCatalogStore};
use combo_offers_server::services::SyncService;
use combo_offers_server::shopify::ShopifyClient;

use super::{CommandError, database_url};

/// Fetch Shopify products and upsert them into the database.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let shopify = ShopifyConfig::from_env()?;

    let pool = db::create_pool(&database_url).await?;
    let client = ShopifyClient::new(&shopify)?;

    tracing::info!(store = %shopify.store, "Syncing products...");
    let summary = SyncService::new(Arc::new(client), Arc::new(PgCatalogStore::new(pool)))
        .sync_products()
        .await?;

    tracing::info!(synced = summary.synced, "Sync complete!");
    Ok(())
}
