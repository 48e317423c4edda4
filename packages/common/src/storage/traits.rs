use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempPath;

use super::error::StorageError;

/// A bucket object copied to local disk.
///
/// The backing temporary file is removed when this value is dropped.
#[derive(Debug)]
pub struct LocalObject {
    path: TempPath,
}

impl LocalObject {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole local copy into memory.
    pub async fn read(&self) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Binary object storage addressed by bucket key.
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Fetch the object stored under `key` into a temporary local file.
    async fn download(&self, key: &str) -> Result<LocalObject, StorageError>;

    /// Remove the object stored under `key`. Removing a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether an object is stored under `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Produce a temporary URL granting read access to the object.
    ///
    /// Fails with [`StorageError::NotFound`] if nothing is stored under `key`.
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}
