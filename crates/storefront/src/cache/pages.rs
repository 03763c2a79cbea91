//! Page cache.
//!
//! Page handlers store their JSON payload here keyed by request path. Each
//! entry carries the tags of the data it was built from, so a publish can
//! drop every page derived from the product table in one call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;

/// Tag for pages built from product rows.
pub const TAG_PRODUCTS: &str = "products";

/// Tag for pages that show brand or category aggregates.
pub const TAG_CATEGORIES: &str = "categories";

/// Page cache invalidation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageCacheError {
    #[error("invalid path '{0}': must be an absolute path without query or whitespace")]
    InvalidPath(String),
    #[error("tag invalidation unavailable: {0}")]
    Invalidation(String),
}

/// A rendered page: the serialized JSON body plus its tags.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Arc<str>,
    pub tags: Arc<[&'static str]>,
    pub rendered_at: DateTime<Utc>,
}

impl CachedPage {
    /// Serialize a page payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `payload` cannot be serialized to JSON.
    pub fn render<T: Serialize>(payload: &T, tags: &[&'static str]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            body: serde_json::to_string(payload)?.into(),
            tags: tags.into(),
            rendered_at: Utc::now(),
        })
    }
}

/// Path-keyed cache of page payloads.
#[derive(Clone)]
pub struct PageCache {
    cache: Cache<String, CachedPage>,
}

impl PageCache {
    /// Create a cache holding at most `max_entries` pages.
    ///
    /// With a `ttl`, pages expire on the same schedule as the catalog
    /// snapshot so a rebuilt page picks up the reloaded products.
    #[must_use]
    pub fn new(max_entries: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(max_entries)
            .support_invalidation_closures();
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }

    /// Look up a page by path.
    pub async fn get(&self, path: &str) -> Option<CachedPage> {
        self.cache.get(path).await
    }

    /// Store a page.
    pub async fn insert(&self, path: &str, page: CachedPage) {
        self.cache.insert(path.to_string(), page).await;
    }

    /// Drop the page cached for `path`.
    ///
    /// # Errors
    ///
    /// Returns `PageCacheError::InvalidPath` if `path` is not a plain absolute path.
    pub async fn invalidate_path(&self, path: &str) -> Result<(), PageCacheError> {
        validate_path(path)?;
        self.cache.invalidate(path).await;
        tracing::debug!(path, "Page invalidated");
        Ok(())
    }

    /// Drop every page carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns `PageCacheError::Invalidation` if the cache rejects the predicate.
    pub fn invalidate_tag(&self, tag: &str) -> Result<(), PageCacheError> {
        let tag = tag.to_string();
        self.cache
            .invalidate_entries_if(move |_, page| page.tags.iter().any(|t| *t == tag))
            .map_err(|e| PageCacheError::Invalidation(e.to_string()))?;
        Ok(())
    }

    /// Apply pending invalidations so `entry_count` is exact.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Approximate number of cached pages.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

fn validate_path(path: &str) -> Result<(), PageCacheError> {
    let valid = path.starts_with('/')
        && !path.contains(['?', '#'])
        && !path.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(PageCacheError::InvalidPath(path.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn page(tags: &[&'static str]) -> CachedPage {
        CachedPage::render(&json!({}), tags).unwrap()
    }

    #[test]
    fn test_render_serializes_payload() {
        let page = CachedPage::render(&json!({"count": 2}), &[TAG_PRODUCTS]).unwrap();
        assert_eq!(&*page.body, r#"{"count":2}"#);
        assert_eq!(&*page.tags, &[TAG_PRODUCTS]);
    }

    #[tokio::test]
    async fn test_invalidate_path() {
        let pages = PageCache::new(10, None);
        pages
            .insert("/store", CachedPage::render(&json!({"n": 1}), &[TAG_PRODUCTS]).unwrap())
            .await;
        assert!(pages.get("/store").await.is_some());

        pages.invalidate_path("/store").await.unwrap();
        assert!(pages.get("/store").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_paths_are_rejected() {
        let pages = PageCache::new(10, None);
        for path in ["store", "", "/store?x=1", "/bad path", "/a#b"] {
            assert_eq!(
                pages.invalidate_path(path).await,
                Err(PageCacheError::InvalidPath(path.to_string()))
            );
        }
    }

    #[tokio::test]
    async fn test_invalidate_tag_only_drops_tagged_pages() {
        let pages = PageCache::new(10, None);
        pages
            .insert("/", page(&[TAG_PRODUCTS, TAG_CATEGORIES]))
            .await;
        pages
            .insert("/product/1", page(&[TAG_PRODUCTS]))
            .await;
        pages.insert("/about", page(&[])).await;

        pages.invalidate_tag(TAG_CATEGORIES).unwrap();
        pages.sync().await;

        assert!(pages.get("/").await.is_none());
        assert!(pages.get("/product/1").await.is_some());
        assert!(pages.get("/about").await.is_some());
    }

    #[tokio::test]
    async fn test_pages_expire_after_ttl() {
        let pages = PageCache::new(10, Some(Duration::from_millis(50)));
        pages.insert("/store", page(&[TAG_PRODUCTS])).await;
        assert!(pages.get("/store").await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(pages.get("/store").await.is_none());
    }

    #[tokio::test]
    async fn test_pages_without_ttl_are_kept() {
        let pages = PageCache::new(10, None);
        pages.insert("/store", page(&[TAG_PRODUCTS])).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(pages.get("/store").await.is_some());
    }
}
