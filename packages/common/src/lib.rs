//! Object storage primitives shared by the storage API: the [`storage::Bucket`]
//! capability, its filesystem and S3 backends, and content fingerprinting.

pub mod storage;
