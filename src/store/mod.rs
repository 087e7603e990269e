//! Store client: the single point of contact with the object store.
//!
//! Callers hold an `Arc<dyn ObjectStore>` constructed once at startup and
//! passed explicitly to whatever needs it. Two backends exist:
//! - [`S3Store`] talks to a remote S3-compatible server (MinIO)
//! - [`MemoryStore`] keeps everything in process, for tests and local runs

pub mod memory_store;
pub mod s3_store;

pub use memory_store::MemoryStore;
pub use s3_store::S3Store;

use crate::models::{bucket::Bucket, object::Object};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{TryStreamExt, stream::BoxStream};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// `make_bucket` on a name that is already taken.
    #[error("bucket `{0}` already exists")]
    BucketAlreadyExists(String),
    /// Transport, auth or server-side failure; carries the raw message.
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Lazy, finite, single-pass sequence of objects produced by one listing call.
pub type ObjectStream = BoxStream<'static, StoreResult<Object>>;

/// Primitive operations over an S3-compatible store.
///
/// None of these check bucket existence on the caller's behalf; that is
/// the caller's job.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns `false` for an absent bucket; errors only on transport failure.
    async fn bucket_exists(&self, name: &str) -> StoreResult<bool>;

    /// All buckets, in whatever order the store reports them.
    async fn list_buckets(&self) -> StoreResult<Vec<Bucket>>;

    /// Fails with [`StoreError::BucketAlreadyExists`] when the name is taken.
    async fn make_bucket(&self, name: &str) -> StoreResult<()>;

    /// Stream objects under `prefix`. With `recursive` set, keys below any
    /// `/` are flattened into the result; otherwise only direct children are
    /// yielded. Nothing is fetched until the stream is polled.
    fn list_objects(&self, bucket: &str, prefix: &str, recursive: bool) -> ObjectStream;

    /// Write (or overwrite) `key`. Returns once the store acknowledged it.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        content_type: &str,
    ) -> StoreResult<Object>;
}

/// Drain a listing into memory for consumers that need more than one pass.
pub async fn collect_objects(stream: ObjectStream) -> StoreResult<Vec<Object>> {
    stream.try_collect().await
}

/// Whether `key` sits directly under `prefix` (no further `/`).
pub(crate) fn is_direct_child(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .map(|rest| !rest.contains('/'))
        .unwrap_or(false)
}
