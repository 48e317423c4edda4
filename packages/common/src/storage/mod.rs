mod error;
mod hash;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use hash::{ContentHash, FINGERPRINT_LEN, object_name, resolve_bucket_key};
pub use traits::{Bucket, LocalObject};
