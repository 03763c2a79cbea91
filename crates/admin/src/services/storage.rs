//! Object storage client for product images.
//!
//! Talks to a Supabase-compatible storage REST API:
//!
//! - Upload: `POST {base}/storage/v1/object/{bucket}/{name}`
//! - Delete: `DELETE {base}/storage/v1/object/{bucket}` with `{"prefixes": [...]}`
//! - Public URL: `{base}/storage/v1/object/public/{bucket}/{name}`
//!
//! Authentication is the service key, sent as a bearer token and as `apikey`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use chrono::Utc;
use rand::Rng;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::StorageConfig;

/// Largest accepted image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5_242_880;

/// Length of the random part of generated blob names.
const RANDOM_SUFFIX_LEN: usize = 9;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors talking to the storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why an uploaded file was refused before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("file is empty")]
    Empty,
    #[error("file is not an image ({0})")]
    NotAnImage(String),
    #[error("file is too large ({0} bytes, max 5MB)")]
    TooLarge(usize),
}

/// Check an upload's content type and size.
///
/// # Errors
///
/// Returns the first rule the file breaks.
pub fn check_image(content_type: Option<&str>, size: usize) -> Result<(), ImageRejection> {
    let content_type = content_type.unwrap_or_default();
    if !content_type.starts_with("image/") {
        let shown = if content_type.is_empty() {
            "no content type"
        } else {
            content_type
        };
        return Err(ImageRejection::NotAnImage(shown.to_string()));
    }
    if size == 0 {
        return Err(ImageRejection::Empty);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ImageRejection::TooLarge(size));
    }
    Ok(())
}

/// Generate a blob name: `{unix_millis}-{9 random base36 chars}.{ext}`.
///
/// The extension is taken from the original file name, falling back to the
/// image subtype of the content type.
#[must_use]
pub fn generate_blob_name(file_name: Option<&str>, content_type: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();

    format!(
        "{}-{suffix}.{}",
        Utc::now().timestamp_millis(),
        extension(file_name, content_type)
    )
}

fn extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type
            .strip_prefix("image/")
            .map(|sub| sub.split([';', '+']).next().unwrap_or_default().trim())
        {
            Some("jpeg") => "jpg".to_string(),
            Some(sub) if !sub.is_empty() => sub.to_ascii_lowercase(),
            _ => "bin".to_string(),
        }
    })
}

/// Extract the blob name from a public URL stored on a product.
///
/// The name is everything after the first `/{bucket}/`, so blobs stored
/// under folders keep their full path. Returns `None` for URLs that don't
/// point into `bucket` or whose path has an unsafe segment.
#[must_use]
pub fn blob_name_from_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{bucket}/");
    let (_, tail) = url.split_once(&marker)?;
    let name = tail.split(['?', '#']).next().unwrap_or_default();
    is_valid_blob_path(name).then(|| name.to_string())
}

/// Whether a `/`-separated blob path is made only of valid segments.
#[must_use]
pub fn is_valid_blob_path(path: &str) -> bool {
    path.split('/').all(is_valid_blob_name)
}

/// Whether a name is a single path segment safe to address in the bucket.
#[must_use]
pub fn is_valid_blob_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_whitespace)
}

/// Storage API client.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the service key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let key = config.service_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StorageError::Config(format!("Invalid service key format: {e}")))?,
        );
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StorageError::Config(format!("Invalid service key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        // Url::join drops the last path segment unless it ends with a slash
        let mut base_url = config.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url,
                bucket: config.bucket.clone(),
            }),
        })
    }

    /// The bucket product images live in.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.inner.bucket
    }

    /// Public URL of a blob.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Url` if the name cannot be joined onto the base URL.
    pub fn public_url(&self, name: &str) -> Result<Url, StorageError> {
        Ok(self.inner.base_url.join(&format!(
            "storage/v1/object/public/{}/{name}",
            self.inner.bucket
        ))?)
    }

    /// Upload an image and return its public URL.
    ///
    /// Existing blobs are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the request fails or the API rejects it.
    pub async fn upload(
        &self,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<Url, StorageError> {
        let url = self
            .inner
            .base_url
            .join(&format!("storage/v1/object/{}/{name}", self.inner.bucket))?;

        let response = self
            .inner
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;
        check_response(response).await?;

        tracing::info!(blob = %name, "Image uploaded");
        self.public_url(name)
    }

    /// Remove blobs from the bucket. Names that don't exist are ignored by the API.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the request fails or the API rejects it.
    pub async fn delete(&self, names: &[String]) -> Result<(), StorageError> {
        if names.is_empty() {
            return Ok(());
        }

        let url = self
            .inner
            .base_url
            .join(&format!("storage/v1/object/{}", self.inner.bucket))?;

        let response = self
            .inner
            .client
            .delete(url)
            .json(&json!({ "prefixes": names }))
            .send()
            .await?;
        check_response(response).await?;

        tracing::info!(count = names.len(), "Images deleted");
        Ok(())
    }
}

async fn check_response(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(StorageError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(base: &str) -> StorageClient {
        StorageClient::new(&StorageConfig {
            url: Url::parse(base).unwrap(),
            service_key: SecretString::from("service-key"),
            bucket: "product-images".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_check_image() {
        assert!(check_image(Some("image/png"), 1024).is_ok());
        assert!(check_image(Some("image/jpeg"), MAX_IMAGE_BYTES).is_ok());
        assert_eq!(
            check_image(Some("image/jpeg"), MAX_IMAGE_BYTES + 1),
            Err(ImageRejection::TooLarge(MAX_IMAGE_BYTES + 1))
        );
        assert_eq!(
            check_image(Some("application/pdf"), 10),
            Err(ImageRejection::NotAnImage("application/pdf".to_string()))
        );
        assert!(matches!(
            check_image(None, 10),
            Err(ImageRejection::NotAnImage(_))
        ));
        assert_eq!(check_image(Some("image/png"), 0), Err(ImageRejection::Empty));
    }

    #[test]
    fn test_generated_blob_name_shape() {
        let name = generate_blob_name(Some("Front View.JPG"), "image/jpeg");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        let (millis, random) = stem.split_once('-').unwrap();

        assert_eq!(ext, "jpg");
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(random.len(), 9);
        assert!(random.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(extension(None, "image/jpeg"), "jpg");
        assert_eq!(extension(Some("noext"), "image/webp"), "webp");
        assert_eq!(extension(Some("icon"), "image/svg+xml"), "svg");
        assert_eq!(extension(Some("a.tar.gz!"), "image/png"), "png");
        assert_eq!(extension(None, ""), "bin");
    }

    #[test]
    fn test_blob_name_from_url() {
        let url = "https://x.supabase.co/storage/v1/object/public/product-images/1700-abc.jpg";
        assert_eq!(
            blob_name_from_url(url, "product-images").as_deref(),
            Some("1700-abc.jpg")
        );
        assert_eq!(
            blob_name_from_url(&format!("{url}?v=2"), "product-images").as_deref(),
            Some("1700-abc.jpg")
        );
        assert_eq!(
            blob_name_from_url("https://elsewhere.test/img/a.jpg", "product-images"),
            None
        );
        assert_eq!(
            blob_name_from_url("https://x.test/product-images/", "product-images"),
            None
        );
    }

    #[test]
    fn test_blob_name_from_url_keeps_folders() {
        let base = "https://x.supabase.co/storage/v1/object/public/product-images";
        assert_eq!(
            blob_name_from_url(&format!("{base}/phones/2024/a.jpg"), "product-images").as_deref(),
            Some("phones/2024/a.jpg")
        );
        // A folder named like the bucket stays part of the name
        assert_eq!(
            blob_name_from_url(&format!("{base}/product-images/a.jpg"), "product-images")
                .as_deref(),
            Some("product-images/a.jpg")
        );
        for bad in ["phones/../a.jpg", "phones//a.jpg", "phones/", "./a.jpg", "a b/c.jpg"] {
            assert_eq!(
                blob_name_from_url(&format!("{base}/{bad}"), "product-images"),
                None,
                "{bad}"
            );
        }
    }

    #[test]
    fn test_blob_name_validation() {
        assert!(is_valid_blob_name("1700-abc.jpg"));
        assert!(!is_valid_blob_name(""));
        assert!(!is_valid_blob_name(".."));
        assert!(!is_valid_blob_name("a/b.jpg"));
        assert!(!is_valid_blob_name("a b.jpg"));

        assert!(is_valid_blob_path("a/b.jpg"));
        assert!(!is_valid_blob_path("a/../b.jpg"));
        assert!(!is_valid_blob_path("a\\b.jpg"));
    }

    #[test]
    fn test_public_url() {
        let url = client("https://x.supabase.co").public_url("a.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "https://x.supabase.co/storage/v1/object/public/product-images/a.jpg"
        );

        // A base with a path keeps it
        let url = client("https://proxy.test/supabase").public_url("a.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.test/supabase/storage/v1/object/public/product-images/a.jpg"
        );
    }
}
