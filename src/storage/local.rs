//! LocalObjectStore: bucketed object storage on local disk.
//!
//! Payloads are sharded beneath `base_path/{bucket}/{shard}/{shard}/{key}` and
//! served back through `GET /storage/{bucket}/{*key}`, which is what
//! [`ObjectStore::public_url`] points at.

use super::{ObjectBody, ObjectStore, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut, stream};
use md5::Context;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const BUCKET_NAME_MIN_LEN: usize = 3;
const BUCKET_NAME_MAX_LEN: usize = 63;

#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    /// Base directory on disk where object payloads are stored.
    base_path: PathBuf,

    /// Prefix for public URLs, e.g. `http://localhost:3000`.
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    fn ensure_key_safe(&self, key: &str) -> StorageResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(StorageError::InvalidObjectKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(StorageError::InvalidObjectKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StorageError::InvalidObjectKey);
        }
        Ok(())
    }

    /// Bucket names: 3–63 chars of lowercase letters, digits and hyphens,
    /// starting and ending with a letter or digit.
    fn ensure_bucket_name_safe(&self, name: &str) -> StorageResult<()> {
        let invalid = |reason: &str| StorageError::InvalidBucketName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let len = name.len();
        if !(BUCKET_NAME_MIN_LEN..=BUCKET_NAME_MAX_LEN).contains(&len) {
            return Err(invalid("must be between 3 and 63 characters"));
        }
        if !name
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(invalid(
                "allowed characters are lowercase letters, digits, and hyphens",
            ));
        }
        if name.starts_with('-') || name.ends_with('-') {
            return Err(invalid("must start and end with a lowercase letter or digit"));
        }
        Ok(())
    }

    fn bucket_root(&self, bucket_name: &str) -> PathBuf {
        self.base_path.join(bucket_name)
    }

    /// Two-level shard identifiers from MD5(bucket/key), 00–ff each.
    fn object_shards(bucket_name: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket_name, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    fn object_path(&self, bucket_name: &str, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(bucket_name, key);
        let mut path = self.bucket_root(bucket_name);
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    async fn ensure_bucket_exists(&self, bucket: &str) -> StorageResult<()> {
        self.ensure_bucket_name_safe(bucket)?;
        match fs::metadata(self.bucket_root(bucket)).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::BucketNotFound(bucket.to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StorageError::BucketNotFound(bucket.to_string()))
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Stream bytes to a temp file, fsync, then rename into place.
    ///
    /// Computes size and MD5 etag while streaming. The temp file is removed on
    /// any failure.
    async fn write_stream<S>(&self, bucket: &str, key: &str, stream: S) -> StorageResult<StoredObject>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        let file_path = self.object_path(bucket, key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageError::Io(io::Error::other("object path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let mut size_bytes: i64 = 0;
        let mut digest = Context::new();
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(StorageError::Io(err));
                }
            };
            size_bytes += chunk.len() as i64;
            digest.consume(&chunk);
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Io(err));
            }
        }

        Ok(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size_bytes,
            etag: format!("{:x}", digest.compute()),
        })
    }

    /// Remove empty directories from `start` up to, not including, `stop`.
    async fn prune_empty_dirs(&self, start: &Path, stop: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => match current.parent() {
                    Some(parent) => current = parent.to_path_buf(),
                    None => break,
                },
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        self.ensure_bucket_name_safe(bucket)?;
        fs::create_dir_all(self.bucket_root(bucket)).await?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        self.ensure_key_safe(key)?;
        self.ensure_bucket_exists(bucket).await?;
        debug!(
            "writing {} bytes to {}/{} ({})",
            data.len(),
            bucket,
            key,
            content_type.unwrap_or("unknown type")
        );
        self.write_stream(bucket, key, stream::once(async move { Ok(data) }))
            .await
    }

    async fn remove(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.ensure_key_safe(key)?;
        self.ensure_bucket_exists(bucket).await?;

        let file_path = self.object_path(bucket, key);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed physical file {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("file {} already missing", file_path.display());
            }
            Err(err) => return Err(StorageError::Io(err)),
        }

        if let Some(parent) = file_path.parent() {
            let bucket_root = self.bucket_root(bucket);
            self.prune_empty_dirs(parent, &bucket_root).await;
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        self.ensure_bucket_name_safe(bucket)?;
        self.ensure_key_safe(key)?;
        Ok(format!("{}/storage/{}/{}", self.public_base_url, bucket, key))
    }

    async fn open(&self, bucket: &str, key: &str) -> StorageResult<ObjectBody> {
        self.ensure_key_safe(key)?;
        self.ensure_bucket_exists(bucket).await?;

        let file_path = self.object_path(bucket, key);
        let not_found = || StorageError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
        let file = File::open(&file_path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                not_found()
            } else {
                StorageError::Io(err)
            }
        })?;
        let size_bytes = file.metadata().await?.len();
        let content_type = mime_guess::from_path(key)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(ObjectBody {
            content_type,
            size_bytes,
            stream: ReaderStream::new(file).boxed(),
        })
    }

    async fn probe(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        let tmp_path = self.base_path.join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&tmp_path, b"readyz").await?;
        let read_back = fs::read(&tmp_path).await;
        let _ = fs::remove_file(&tmp_path).await;
        if read_back? != b"readyz" {
            return Err(StorageError::Io(io::Error::other("file content mismatch")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, LocalObjectStore) {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path(), "http://localhost:3000/");
        store.ensure_bucket("gallery-gh").await.unwrap();
        (tmp, store)
    }

    async fn read_all(body: ObjectBody) -> Vec<u8> {
        let chunks: Vec<_> = body.stream.collect().await;
        chunks
            .into_iter()
            .flat_map(|c| c.unwrap().to_vec())
            .collect()
    }

    #[tokio::test]
    async fn upload_then_open_round_trips_bytes() {
        let (_tmp, store) = store().await;
        let stored = store
            .upload(
                "gallery-gh",
                "events/a.jpg",
                Some("image/jpeg"),
                Bytes::from_static(b"hello"),
            )
            .await
            .unwrap();
        assert_eq!(stored.size_bytes, 5);
        assert_eq!(stored.etag, format!("{:x}", md5::compute(b"hello")));

        let body = store.open("gallery-gh", "events/a.jpg").await.unwrap();
        assert_eq!(body.content_type, "image/jpeg");
        assert_eq!(body.size_bytes, 5);
        assert_eq!(read_all(body).await, b"hello");
    }

    #[tokio::test]
    async fn public_url_points_at_storage_route() {
        let (_tmp, store) = store().await;
        assert_eq!(
            store.public_url("gallery-gh", "events/a.jpg").unwrap(),
            "http://localhost:3000/storage/gallery-gh/events/a.jpg"
        );
    }

    #[tokio::test]
    async fn unknown_bucket_and_unsafe_keys_are_rejected() {
        let (_tmp, store) = store().await;
        let err = store
            .upload("gallery-ke", "a.jpg", None, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BucketNotFound(_)));

        let err = store
            .upload("gallery-gh", "../escape", None, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidObjectKey));

        let err = store.ensure_bucket("Bad_Bucket").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidBucketName { .. }));
    }

    #[tokio::test]
    async fn remove_deletes_payload_and_prunes_shards() {
        let (tmp, store) = store().await;
        store
            .upload("gallery-gh", "a.jpg", None, Bytes::from_static(b"x"))
            .await
            .unwrap();
        store.remove("gallery-gh", "a.jpg").await.unwrap();

        let err = store.open("gallery-gh", "a.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::ObjectNotFound { .. }));

        let remaining = std::fs::read_dir(tmp.path().join("gallery-gh"))
            .unwrap()
            .count();
        assert_eq!(remaining, 0);

        // Removing again is fine.
        store.remove("gallery-gh", "a.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn probe_succeeds_on_writable_root() {
        let (_tmp, store) = store().await;
        store.probe().await.unwrap();
    }
}
