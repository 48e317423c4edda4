use std::time::Duration;

use async_trait::async_trait;
use ::s3::creds::Credentials;
use ::s3::error::S3Error;
use ::s3::{Bucket as S3Client, Region};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::StorageError;
use super::traits::{Bucket, LocalObject};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub name: String,
    pub region: String,
    /// Custom endpoint for non-AWS providers (MinIO, Ceph, Qarnot...).
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub path_style: bool,
}

/// Bucket backed by an S3-compatible object store.
///
/// The client handle is created on first use and shared by all requests.
pub struct S3Bucket {
    settings: S3Settings,
    client: OnceCell<Box<S3Client>>,
}

impl S3Bucket {
    pub fn new(settings: S3Settings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&S3Client, StorageError> {
        let client = self
            .client
            .get_or_try_init(|| async { self.connect() })
            .await?;
        Ok(client.as_ref())
    }

    fn connect(&self) -> Result<Box<S3Client>, StorageError> {
        let region = match &self.settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: self.settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => self
                .settings
                .region
                .parse()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            self.settings.access_key.as_deref(),
            self.settings.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let client = S3Client::new(&self.settings.name, region, credentials).map_err(backend)?;
        info!(bucket = %self.settings.name, "Connected to object storage");

        Ok(if self.settings.path_style {
            client.with_path_style()
        } else {
            client
        })
    }
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl Bucket for S3Bucket {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let client = self.client().await?;
        let response = client
            .put_object_with_content_type(
                key,
                data,
                content_type.unwrap_or("application/octet-stream"),
            )
            .await
            .map_err(backend)?;

        let status = response.status_code();
        if !is_success(status) {
            return Err(StorageError::Backend(format!(
                "PUT {key} returned status {status}"
            )));
        }
        debug!(key, size = data.len(), "Object stored");
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<LocalObject, StorageError> {
        let client = self.client().await?;
        let response = client.get_object(key).await.map_err(backend)?;

        match response.status_code() {
            404 => return Err(StorageError::NotFound(key.to_string())),
            status if !is_success(status) => {
                return Err(StorageError::Backend(format!(
                    "GET {key} returned status {status}"
                )));
            }
            _ => {}
        }

        let local = tempfile::Builder::new()
            .prefix("pyrostore-")
            .tempfile()?
            .into_temp_path();
        tokio::fs::write(&local, response.bytes()).await?;

        Ok(LocalObject::new(local))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let client = self.client().await?;
        let response = client.delete_object(key).await.map_err(backend)?;

        let status = response.status_code();
        if !is_success(status) && status != 404 {
            return Err(StorageError::Backend(format!(
                "DELETE {key} returned status {status}"
            )));
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let client = self.client().await?;
        let (_, status) = client.head_object(key).await.map_err(backend)?;

        match status {
            404 => Ok(false),
            status if is_success(status) => Ok(true),
            status => Err(StorageError::Backend(format!(
                "HEAD {key} returned status {status}"
            ))),
        }
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let client = self.client().await?;
        let expiry_secs = u32::try_from(expires_in.as_secs()).unwrap_or(u32::MAX);
        client
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(backend)
    }
}
