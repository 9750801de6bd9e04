//! Catalog persistence.
//!
//! # Tables
//!
//! - `products` - Shopify products mirrored by the catalog sync, keyed by
//!   `external_id` (the Shopify product ID)
//! - `combo_offers` - Combo definitions; the `CHECK` constraint keeps the
//!   normal/categorized columns mutually exclusive
//!
//! # Implementations
//!
//! - [`PgCatalogStore`] - `PostgreSQL` via `sqlx` (production)
//! - [`MemoryCatalogStore`] - in-process vectors (tests)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p combo-offers-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use combo_offers_core::{ComboOffer, ComboOfferId, NewComboOffer, Product, ProductPatch};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Persistence for mirrored products and combo offers.
///
/// Implementations serialize conflicting writes to the same entity; callers
/// may issue concurrent upserts freely.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert or update a product keyed by its Shopify ID.
    ///
    /// Only fields set in `patch` are written when the product exists.
    async fn upsert_product(
        &self,
        external_id: &str,
        patch: &ProductPatch,
    ) -> Result<(), RepositoryError>;

    /// All products, in insertion order.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// All combo offers, oldest first.
    async fn list_combo_offers(&self) -> Result<Vec<ComboOffer>, RepositoryError>;

    /// Fetch a single combo offer.
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist.
    async fn get_combo_offer(&self, id: ComboOfferId) -> Result<ComboOffer, RepositoryError>;

    /// Persist a new combo offer, assigning its ID and creation time.
    async fn create_combo_offer(&self, offer: NewComboOffer) -> Result<ComboOffer, RepositoryError>;

    /// Delete a combo offer.
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist.
    async fn delete_combo_offer(&self, id: ComboOfferId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
