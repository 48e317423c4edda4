use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{Bucket, LocalObject};

/// Filesystem-backed bucket.
///
/// Objects live at `{base_path}/{bucket key}`; keys may contain `/` to
/// address subfolders. Writes go through `{base_path}/.tmp` and are renamed
/// into place so a reader never observes a partial object.
pub struct FilesystemBucket {
    base_path: PathBuf,
}

impl FilesystemBucket {
    /// Create a new filesystem bucket rooted at `base_path`.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        let base_path = fs::canonicalize(&base_path).await?;
        Ok(Self { base_path })
    }

    /// Map a bucket key onto a path below the base directory.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && !key.starts_with(".tmp")
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(relative))
    }

    fn temp_dir(&self) -> PathBuf {
        self.base_path.join(".tmp")
    }
}

#[async_trait]
impl Bucket for FilesystemBucket {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        let temp_path = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(self.temp_dir())?
            .into_temp_path();

        fs::write(&temp_path, data).await?;

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&temp_path, &object_path).await?;

        Ok(())
    }

    async fn download(&self, key: &str) -> Result<LocalObject, StorageError> {
        let object_path = self.object_path(key)?;
        let local = tempfile::Builder::new()
            .prefix("download-")
            .tempfile_in(self.temp_dir())?
            .into_temp_path();

        match fs::copy(&object_path, &local).await {
            Ok(_) => Ok(LocalObject::new(local)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(key)?;
        Ok(fs::try_exists(&object_path).await?)
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let object_path = self.object_path(key)?;
        let expires_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            + expires_in;
        Ok(format!(
            "file://{}?expires={}",
            object_path.display(),
            expires_at.as_secs()
        ))
    }
}
