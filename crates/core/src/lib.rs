//! Combo Offers Core - Shared domain types.
//!
//! This crate provides the types shared by the server, CLI and tests:
//! - Catalog products mirrored from Shopify
//! - Combo offers (normal and categorized bundles)
//! - Validation of inbound combo requests
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. The `postgres` feature adds `sqlx` encoding for
//! the ID newtypes.
//!
//! # Modules
//!
//! - [`types`] - IDs, products, combo offers and request validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
