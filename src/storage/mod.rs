//! Object storage for uploaded images.
//!
//! The gallery talks to storage only through [`ObjectStore`], so the local
//! disk implementation can be swapped for a hosted bucket service (or a fake
//! in tests) without touching the upload pipeline.

pub mod local;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;
use std::io;
use thiserror::Error;

pub use local::LocalObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket `{0}` not found")]
    BucketNotFound(String),
    #[error("bucket `{name}` invalid: {reason}")]
    InvalidBucketName { name: String, reason: String },
    #[error("object `{key}` not found in bucket `{bucket}`")]
    ObjectNotFound { bucket: String, key: String },
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// What the store reports back after a successful write.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub size_bytes: i64,
    pub etag: String,
}

/// An object opened for reading.
pub struct ObjectBody {
    pub content_type: String,
    pub size_bytes: u64,
    pub stream: BoxStream<'static, io::Result<Bytes>>,
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Bucketed blob storage with public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Write `data` under `bucket/key`, replacing any existing object.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Remove an object. Removing a missing object is not an error.
    async fn remove(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Public URL under which the object is served.
    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String>;

    async fn open(&self, bucket: &str, key: &str) -> StorageResult<ObjectBody>;

    /// Readiness check: the store can currently accept writes.
    async fn probe(&self) -> StorageResult<()>;
}
