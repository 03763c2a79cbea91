//! Catalog cache.
//!
//! Holds a single snapshot of every product. The first reader after a clear
//! loads the table; concurrent readers wait on the same load instead of
//! issuing their own query.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use techstore_core::Product;

use crate::db::{ProductRepository, RepositoryError};

/// Where the catalog is loaded from.
pub trait ProductSource: Send + Sync + 'static {
    /// Load every product.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;
}

impl ProductSource for PgPool {
    async fn load_all(&self) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(self).list_all().await
    }
}

/// Catalog load failure, shared between all readers that waited on it.
#[derive(Debug, Clone, Error)]
#[error("failed to load catalog: {0}")]
pub struct CatalogError(#[source] Arc<RepositoryError>);

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        Self(Arc::new(err))
    }
}

/// An immutable view of the catalog at load time.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub products: Arc<[Product]>,
    pub loaded_at: DateTime<Utc>,
}

/// Cache state reported by the revalidation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub cached: bool,
    pub product_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub age_seconds: Option<i64>,
}

/// Single-entry cache over a [`ProductSource`].
pub struct CatalogCache<S> {
    inner: Arc<CatalogCacheInner<S>>,
}

impl<S> Clone for CatalogCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CatalogCacheInner<S> {
    source: S,
    cache: Cache<(), CatalogSnapshot>,
}

impl<S: ProductSource> CatalogCache<S> {
    /// Create an empty cache. With `ttl` set the snapshot also expires on its own.
    #[must_use]
    pub fn new(source: S, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(1);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            inner: Arc::new(CatalogCacheInner {
                source,
                cache: builder.build(),
            }),
        }
    }

    /// Get the cached snapshot, loading it if absent.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source fails. Failures are not cached.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        self.inner
            .cache
            .try_get_with((), self.load())
            .await
            .map_err(CatalogError)
    }

    /// Get every product, loading the catalog if needed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source fails.
    pub async fn products(&self) -> Result<Arc<[Product]>, CatalogError> {
        Ok(self.snapshot().await?.products)
    }

    /// Load from the source and replace the cached snapshot.
    ///
    /// Returns the number of products loaded. On failure the cache is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source fails.
    pub async fn refresh(&self) -> Result<usize, CatalogError> {
        let snapshot = self.load().await?;
        let count = snapshot.products.len();
        self.inner.cache.insert((), snapshot).await;
        tracing::info!(product_count = count, "Catalog cache refreshed");
        Ok(count)
    }

    /// Drop the cached snapshot. The next reader reloads it.
    pub async fn clear(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
        tracing::info!("Catalog cache cleared");
    }

    /// Describe what is cached right now.
    pub async fn info(&self) -> CacheInfo {
        match self.inner.cache.get(&()).await {
            Some(snapshot) => CacheInfo {
                cached: true,
                product_count: snapshot.products.len(),
                loaded_at: Some(snapshot.loaded_at),
                age_seconds: Some((Utc::now() - snapshot.loaded_at).num_seconds()),
            },
            None => CacheInfo {
                cached: false,
                product_count: 0,
                loaded_at: None,
                age_seconds: None,
            },
        }
    }

    async fn load(&self) -> Result<CatalogSnapshot, RepositoryError> {
        let products = self.inner.source.load_all().await?;
        tracing::debug!(product_count = products.len(), "Catalog loaded from source");
        Ok(CatalogSnapshot {
            products: products.into(),
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use rust_decimal::Decimal;
    use techstore_core::{ProductCategory, ProductId, ProductSpecs};

    use super::*;

    #[derive(Default)]
    struct FakeSource {
        loads: AtomicUsize,
        failing: AtomicBool,
    }

    impl ProductSource for Arc<FakeSource> {
        async fn load_all(&self) -> Result<Vec<Product>, RepositoryError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(RepositoryError::DataCorruption("offline".to_string()));
            }
            let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((1..=n)
                .map(|id| Product {
                    id: ProductId::new(i32::try_from(id).unwrap()),
                    name: format!("Product {id}"),
                    brand: None,
                    category: ProductCategory::Phone,
                    price: Decimal::ONE_HUNDRED,
                    discount_price: None,
                    stock: 1,
                    is_available: true,
                    description: String::new(),
                    thumbnail: None,
                    pictures: vec![],
                    specs: ProductSpecs::default(),
                    colors: vec![],
                    sizes: vec![],
                    rating: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_products_loads_once_until_cleared() {
        let source = Arc::new(FakeSource::default());
        let cache = CatalogCache::new(Arc::clone(&source), None);

        assert_eq!(cache.products().await.unwrap().len(), 1);
        assert_eq!(cache.products().await.unwrap().len(), 1);
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);

        cache.clear().await;
        assert!(!cache.info().await.cached);
        assert_eq!(cache.products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let source = Arc::new(FakeSource::default());
        let cache = CatalogCache::new(Arc::clone(&source), None);

        cache.products().await.unwrap();
        assert_eq!(cache.refresh().await.unwrap(), 2);

        let info = cache.info().await;
        assert!(info.cached);
        assert_eq!(info.product_count, 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let source = Arc::new(FakeSource::default());
        let cache = CatalogCache::new(Arc::clone(&source), None);

        source.failing.store(true, Ordering::SeqCst);
        assert!(cache.products().await.is_err());
        assert!(cache.refresh().await.is_err());
        assert!(!cache.info().await.cached);

        source.failing.store(false, Ordering::SeqCst);
        assert_eq!(cache.products().await.unwrap().len(), 1);
    }
}
