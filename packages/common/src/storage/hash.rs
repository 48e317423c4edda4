use std::fmt;

use sha2::{Digest, Sha256};

/// Number of hex characters of the digest used as a content fingerprint.
pub const FINGERPRINT_LEN: usize = 32;

/// A SHA-256 content hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute the SHA-256 hash of the given data.
    pub fn compute(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(hash.into())
    }

    /// Return the hash as a 64-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Return the first [`FINGERPRINT_LEN`] hex characters of the hash.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.0[..FINGERPRINT_LEN / 2])
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Build the content-addressed object name `{fingerprint}.{extension}`.
///
/// The extension is everything after the last `.` of `file_name`; a name
/// without any dot is used whole.
pub fn object_name(hash: &ContentHash, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(file_name);
    format!("{}.{extension}", hash.fingerprint())
}

/// Prepend the bucket subfolder, if any, to an object name.
pub fn resolve_bucket_key(object_name: &str, folder: Option<&str>) -> String {
    match folder {
        Some(folder) => format!("{folder}/{object_name}"),
        None => object_name.to_string(),
    }
}
