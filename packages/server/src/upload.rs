//! Content-addressed upload with read-after-write verification.
//!
//! One call runs strictly in sequence:
//! fetch record → hash → (key unchanged: done)
//! | upload → read back → re-hash → (match: persist key | mismatch: delete object, fail).
//! No step is retried; every failure ends the call and leaves the record untouched.

use std::time::Duration;

use common::storage::{Bucket, ContentHash, StorageError, object_name, resolve_bucket_key};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, Value,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::entity::{annotation, media};
use crate::error::{AppError, MISSING_OBJECT_DETAIL};
use crate::utils::crud::{get_entry, update_entry};

/// Width of the `bucket_key` columns of media and annotations.
pub const MAX_BUCKET_KEY_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The bucket refused the write. Nothing was stored.
    #[error("failed to upload object {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The object was written but could not be read back, so it is unverified.
    #[error("unable to read back object {key}: {source}")]
    Integrity {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The bytes read back do not hash to the uploaded content.
    #[error("object {key} was corrupted during upload")]
    Corruption { key: String },

    /// The file name yields a key the record cannot hold. Nothing was stored.
    #[error("bucket key {key} exceeds {MAX_BUCKET_KEY_LEN} characters")]
    KeyTooLong { key: String },
}

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The record already points at this exact content; the bucket was not touched.
    Unchanged,
    /// The content was stored and verified under this key.
    Stored(String),
}

/// Entities whose rows reference an object in the bucket.
pub trait StoredObject: EntityTrait {
    fn bucket_key(model: &Self::Model) -> Option<&str>;
    fn bucket_key_column() -> Self::Column;
}

impl StoredObject for media::Entity {
    fn bucket_key(model: &media::Model) -> Option<&str> {
        model.bucket_key.as_deref()
    }

    fn bucket_key_column() -> media::Column {
        media::Column::BucketKey
    }
}

impl StoredObject for annotation::Entity {
    fn bucket_key(model: &annotation::Model) -> Option<&str> {
        model.bucket_key.as_deref()
    }

    fn bucket_key_column() -> annotation::Column {
        annotation::Column::BucketKey
    }
}

/// Compute the bucket key of `file` and store it unless `current_key` already matches.
pub async fn store_verified(
    bucket: &dyn Bucket,
    current_key: Option<&str>,
    folder: Option<&str>,
    file: &UploadedFile,
) -> Result<StoreOutcome, UploadError> {
    let hash = ContentHash::compute(&file.data);
    let key = resolve_bucket_key(&object_name(&hash, &file.file_name), folder);

    if current_key == Some(key.as_str()) {
        debug!(key, "Content unchanged, skipping upload");
        return Ok(StoreOutcome::Unchanged);
    }
    if key.chars().count() > MAX_BUCKET_KEY_LEN {
        return Err(UploadError::KeyTooLong { key });
    }

    bucket
        .upload(&key, &file.data, file.content_type.as_deref())
        .await
        .map_err(|source| UploadError::Upload {
            key: key.clone(),
            source,
        })?;

    let local = bucket
        .download(&key)
        .await
        .map_err(|source| UploadError::Integrity {
            key: key.clone(),
            source,
        })?;
    let retrieved = local
        .read()
        .await
        .map_err(|source| UploadError::Integrity {
            key: key.clone(),
            source,
        })?;
    // The read-back copy is removed from disk as soon as it has been hashed.
    let intact = ContentHash::compute(&retrieved) == hash;
    drop(local);

    if !intact {
        error!(key, expected = %hash, "Hash mismatch after upload");
        if let Err(e) = bucket.delete(&key).await {
            warn!(key, "Failed to delete corrupted object: {e}");
        }
        return Err(UploadError::Corruption { key });
    }

    Ok(StoreOutcome::Stored(key))
}

/// Upload `file` as the content of row `id` of `E`.
///
/// Returns the row unchanged when its key already addresses identical
/// content, otherwise the row with its bucket key replaced.
pub async fn upload_object<E, C>(
    db: &C,
    bucket: &dyn Bucket,
    folder: Option<&str>,
    id: i32,
    file: &UploadedFile,
) -> Result<E::Model, AppError>
where
    C: ConnectionTrait,
    E: StoredObject,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    let entry = get_entry::<E, C>(db, id).await?;

    match store_verified(bucket, E::bucket_key(&entry), folder, file).await? {
        StoreOutcome::Unchanged => Ok(entry),
        StoreOutcome::Stored(key) => {
            info!(id, key, "Stored verified object");
            let mut active = entry.into_active_model();
            active.set(E::bucket_key_column(), Value::from(Some(key)));
            update_entry(db, active).await
        }
    }
}

/// Temporary read URL for the object a record points at.
///
/// 404 if the record has never been uploaded or the object is gone from the bucket.
pub async fn object_url(
    bucket: &dyn Bucket,
    key: Option<&str>,
    expires_in: Duration,
) -> Result<String, AppError> {
    let key = key.ok_or_else(|| AppError::NotFound(MISSING_OBJECT_DETAIL.into()))?;
    Ok(bucket.presigned_url(key, expires_in).await?)
}
