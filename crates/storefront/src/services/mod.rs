//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Session-backed cart persistence
//! - `checkout` - Order validation and WhatsApp message composition
//! - `revalidate` - Catalog reload and page invalidation on publish

pub mod cart;
pub mod checkout;
pub mod revalidate;

pub use cart::CartStore;
