use thiserror::Error;

/// Errors that can occur during bucket operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object is stored under the requested key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The key cannot be mapped onto the backing store.
    #[error("invalid bucket key: {0}")]
    InvalidKey(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote object store rejected or failed the request.
    #[error("bucket backend error: {0}")]
    Backend(String),
}
