//! Tech Store Core - Shared domain library.
//!
//! This crate provides the domain model used across all Tech Store components:
//! - `storefront` - Public catalog, cart and checkout
//! - `admin` - Product management and publishing
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices and the product record
//! - [`cart`] - Cart lines with price snapshots, stock clamping and totals
//! - [`catalog`] - Catalog filtering, sorting and derived views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartLine, CartVariant};
pub use catalog::{Availability, CatalogQuery, SortOrder};
pub use types::*;
