//! Catalog revalidation.
//!
//! Triggered by the admin after products change: reloads the catalog cache,
//! then drops cached pages by path and by tag so they are rebuilt from the
//! fresh catalog on the next request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use techstore_core::ProductId;

use crate::cache::{
    CacheInfo, CatalogCache, CatalogError, PageCache, ProductSource, TAG_CATEGORIES, TAG_PRODUCTS,
};

/// Paths revalidated when the request names none.
pub const DEFAULT_PATHS: [&str; 2] = ["/", "/store"];

/// Tags invalidated on every revalidation.
pub const REVALIDATED_TAGS: [&str; 2] = [TAG_PRODUCTS, TAG_CATEGORIES];

/// What changed in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevalidateAction {
    Add,
    Update,
    Delete,
    FullUpdate,
}

/// Body of `POST /api/revalidate`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub action: Option<RevalidateAction>,
    #[serde(default, alias = "productId")]
    pub product_id: Option<ProductId>,
}

impl RevalidateRequest {
    /// Paths to invalidate.
    ///
    /// An action together with a product id takes precedence over explicit
    /// paths; updates and deletes also cover the product's own page.
    #[must_use]
    pub fn target_paths(&self) -> Vec<String> {
        let defaults = || DEFAULT_PATHS.iter().map(ToString::to_string).collect::<Vec<_>>();

        match (self.action, self.product_id) {
            (Some(RevalidateAction::Update | RevalidateAction::Delete), Some(id)) => {
                let mut paths = defaults();
                paths.push(format!("/product/{id}"));
                paths
            }
            (Some(RevalidateAction::Add | RevalidateAction::FullUpdate), Some(_)) => defaults(),
            _ => self.paths.clone().unwrap_or_else(defaults),
        }
    }
}

/// Outcome for a single path or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevalidateStatus {
    Success,
    Error,
}

/// Per-path result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    pub path: String,
    pub status: RevalidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-tag result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagResult {
    pub tag: String,
    pub status: RevalidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a revalidation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevalidateReport {
    pub success: bool,
    pub message: String,
    pub results: Vec<PathResult>,
    pub tag_results: Vec<TagResult>,
    pub timestamp: DateTime<Utc>,
    pub cache_info: CacheInfo,
}

/// Reload the catalog and invalidate pages.
///
/// Path and tag failures are recorded in the report and do not stop the
/// remaining invalidations.
///
/// # Errors
///
/// Returns `CatalogError` if the catalog cannot be reloaded. In that case no
/// page is invalidated, so stale pages keep being served.
pub async fn revalidate<S: ProductSource>(
    catalog: &CatalogCache<S>,
    pages: &PageCache,
    request: &RevalidateRequest,
) -> Result<RevalidateReport, CatalogError> {
    tracing::info!(
        action = ?request.action,
        product_id = ?request.product_id,
        paths = ?request.paths,
        "Revalidation requested"
    );

    catalog.clear().await;
    let product_count = catalog.refresh().await?;

    let mut results = Vec::new();
    for path in request.target_paths() {
        match pages.invalidate_path(&path).await {
            Ok(()) => results.push(PathResult {
                path,
                status: RevalidateStatus::Success,
                error: None,
            }),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to revalidate path");
                results.push(PathResult {
                    path,
                    status: RevalidateStatus::Error,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let tag_results = REVALIDATED_TAGS
        .iter()
        .map(|tag| match pages.invalidate_tag(tag) {
            Ok(()) => TagResult {
                tag: (*tag).to_string(),
                status: RevalidateStatus::Success,
                error: None,
            },
            Err(e) => {
                tracing::warn!(tag = %tag, error = %e, "Failed to revalidate tag");
                TagResult {
                    tag: (*tag).to_string(),
                    status: RevalidateStatus::Error,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    tracing::info!(product_count, "Revalidation complete");

    Ok(RevalidateReport {
        success: true,
        message: format!("Catalog reloaded with {product_count} products, pages revalidated"),
        results,
        tag_results,
        timestamp: Utc::now(),
        cache_info: catalog.info().await,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert_eq!(RevalidateRequest::default().target_paths(), vec!["/", "/store"]);
    }

    #[test]
    fn test_explicit_paths_override_defaults() {
        let request = RevalidateRequest {
            paths: Some(vec!["/store".to_string()]),
            ..Default::default()
        };
        assert_eq!(request.target_paths(), vec!["/store"]);
    }

    #[test]
    fn test_update_and_delete_cover_product_page() {
        for action in [RevalidateAction::Update, RevalidateAction::Delete] {
            let request = RevalidateRequest {
                paths: Some(vec!["/ignored".to_string()]),
                action: Some(action),
                product_id: Some(ProductId::new(42)),
            };
            assert_eq!(request.target_paths(), vec!["/", "/store", "/product/42"]);
        }
    }

    #[test]
    fn test_add_uses_defaults() {
        let request = RevalidateRequest {
            action: Some(RevalidateAction::Add),
            product_id: Some(ProductId::new(42)),
            ..Default::default()
        };
        assert_eq!(request.target_paths(), vec!["/", "/store"]);
    }

    #[test]
    fn test_action_without_product_id_keeps_paths() {
        let request = RevalidateRequest {
            paths: Some(vec!["/store".to_string()]),
            action: Some(RevalidateAction::Update),
            product_id: None,
        };
        assert_eq!(request.target_paths(), vec!["/store"]);
    }

    #[test]
    fn test_request_accepts_camel_case_product_id() {
        let request: RevalidateRequest =
            serde_json::from_str(r#"{"action":"full_update","productId":7}"#).unwrap();
        assert_eq!(request.action, Some(RevalidateAction::FullUpdate));
        assert_eq!(request.product_id, Some(ProductId::new(7)));
    }
}
