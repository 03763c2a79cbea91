//! Core types for Tech Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::{effective_price, format_price};
pub use product::{Product, ProductCategory, ProductCategoryError, ProductSpecs};

#[cfg(feature = "postgres")]
pub use product::ProductRow;
