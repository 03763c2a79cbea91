//! In-process caches.
//!
//! - [`catalog`] - The full product list, loaded once and reused until cleared
//! - [`pages`] - Rendered page payloads keyed by path, invalidated by path or tag
//!
//! Both are `moka` caches. Neither expires on its own unless configured to;
//! the admin's publish flow drives invalidation through `/api/revalidate`.

pub mod catalog;
pub mod pages;

pub use catalog::{CacheInfo, CatalogCache, CatalogError, CatalogSnapshot, ProductSource};
pub use pages::{CachedPage, PageCache, PageCacheError, TAG_CATEGORIES, TAG_PRODUCTS};
