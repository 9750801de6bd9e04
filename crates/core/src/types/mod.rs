//! Core types for the combo offers backend.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod combo;
pub mod id;
pub mod product;
pub mod request;

pub use combo::{
    ComboCategory, ComboOffer, ComboSelection, ComboSummary, ComboType, NewComboOffer,
    RepresentativeProduct,
};
pub use id::*;
pub use product::{Product, ProductPatch};
pub use request::{CategoryRequest, ComboDraft, ComboRequestError, CreateComboRequest};
