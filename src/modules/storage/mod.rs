//! Object storage for uploaded files.
//!
//! `ObjectStorage` is the seam used by services; `MinIOClient` is the
//! production implementation.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store a publicly readable object at `path` below the public prefix and
    /// return its URL
    async fn put_public(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError>;

    /// Remove an object previously returned by `put_public`
    async fn delete_by_url(&self, url: &str) -> Result<(), AppError>;
}
