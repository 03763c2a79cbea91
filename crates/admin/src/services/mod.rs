//! Outbound integrations: image storage and storefront publishing.

pub mod publish;
pub mod storage;

pub use publish::{PublishAction, PublishError, PublishRequest, StorefrontPublisher};
pub use storage::{ImageRejection, StorageClient, StorageError};
