//! Storefront publishing.
//!
//! Publishing asks the storefront to reload its catalog and drop cached
//! pages by calling `POST {STOREFRONT_URL}/api/revalidate` with the shared
//! token in `x-admin-token`.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use techstore_core::ProductId;

/// Header carrying the shared revalidation token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors publishing to the storefront.
#[derive(Debug, Error)]
pub enum PublishError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storefront refused the request.
    #[error("storefront returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Storefront URL could not be built.
    #[error("invalid storefront URL: {0}")]
    Url(#[from] url::ParseError),
}

/// What changed in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    Add,
    Update,
    Delete,
    FullUpdate,
}

/// Body sent to the storefront revalidation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<PublishAction>,
    #[serde(default, alias = "productId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

impl PublishRequest {
    /// Publish a change to one product.
    #[must_use]
    pub const fn product(action: PublishAction, id: ProductId) -> Self {
        Self {
            action: Some(action),
            product_id: Some(id),
            paths: Vec::new(),
        }
    }

    /// Publish the whole catalog.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            action: Some(PublishAction::FullUpdate),
            product_id: None,
            paths: Vec::new(),
        }
    }
}

/// Client for the storefront revalidation endpoint.
#[derive(Clone)]
pub struct StorefrontPublisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    client: reqwest::Client,
    endpoint: Url,
    token: SecretString,
}

impl StorefrontPublisher {
    /// Create a publisher for the storefront at `storefront_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL cannot be built or the HTTP client
    /// fails to build.
    pub fn new(storefront_url: &Url, token: SecretString) -> Result<Self, PublishError> {
        let endpoint = storefront_url.join("/api/revalidate")?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(PublisherInner {
                client,
                endpoint,
                token,
            }),
        })
    }

    /// The revalidation endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Send a publish request and return the storefront's report.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the request fails or the storefront answers
    /// with a non-success status.
    pub async fn publish(&self, request: &PublishRequest) -> Result<Value, PublishError> {
        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header(ADMIN_TOKEN_HEADER, self.inner.token.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let report = response.json::<Value>().await?;
        tracing::info!(
            action = ?request.action,
            product_id = ?request.product_id,
            "Storefront revalidated"
        );
        Ok(report)
    }

    /// Publish without waiting for the result. Failures are logged.
    pub fn publish_in_background(&self, request: PublishRequest) {
        let publisher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(&request).await {
                tracing::warn!(
                    error = %e,
                    action = ?request.action,
                    product_id = ?request.product_id,
                    "Automatic storefront publish failed"
                );
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_endpoint_is_under_storefront_root() {
        let publisher = StorefrontPublisher::new(
            &Url::parse("https://shop.test/some/page").unwrap(),
            SecretString::from("t"),
        )
        .unwrap();
        assert_eq!(
            publisher.endpoint().as_str(),
            "https://shop.test/api/revalidate"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(PublishRequest::product(
            PublishAction::Delete,
            ProductId::new(7),
        ))
        .unwrap();
        assert_eq!(body, json!({ "action": "delete", "product_id": 7 }));

        let body = serde_json::to_value(PublishRequest::full()).unwrap();
        assert_eq!(body, json!({ "action": "full_update" }));
    }

    #[test]
    fn test_request_accepts_empty_body_fields() {
        let request: PublishRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.action, None);
        assert!(request.paths.is_empty());

        let request: PublishRequest =
            serde_json::from_str(r#"{"action":"update","productId":3}"#).unwrap();
        assert_eq!(request, PublishRequest::product(PublishAction::Update, ProductId::new(3)));
    }
}
