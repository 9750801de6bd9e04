//! Catalog workflows.
//!
//! # Services
//!
//! - `sync` - Mirror Shopify products into the local store
//! - `combos` - Create and delete combo offers, with their Shopify products
//!   and metafields

pub mod combos;
pub mod sync;

#[cfg(test)]
pub(crate) mod fakes;

pub use combos::{ComboCreated, ComboDeleted, ComboService, MetafieldOutcome};
pub use sync::{SyncService, SyncSummary};
