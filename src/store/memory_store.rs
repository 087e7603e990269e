//! In-process `ObjectStore`.
//!
//! Buckets keep creation order, objects are sorted by key. Failures can be
//! injected per bucket listing or for the whole store.

use super::{ObjectStore, ObjectStream, StoreError, StoreResult, is_direct_child};
use crate::models::{bucket::Bucket, object::Object};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    buckets: Vec<BucketEntry>,
    unavailable: Option<String>,
}

struct BucketEntry {
    bucket: Bucket,
    objects: BTreeMap<String, StoredObject>,
    listing_failure: Option<String>,
}

struct StoredObject {
    meta: Object,
    payload: Bytes,
}

impl Inner {
    fn check_available(&self) -> StoreResult<()> {
        match &self.unavailable {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn bucket(&self, name: &str) -> Option<&BucketEntry> {
        self.buckets.iter().find(|entry| entry.bucket.name == name)
    }

    fn bucket_mut(&mut self, name: &str) -> Option<&mut BucketEntry> {
        self.buckets.iter_mut().find(|entry| entry.bucket.name == name)
    }
}

fn no_such_bucket(name: &str) -> StoreError {
    StoreError::Backend(format!(
        "NoSuchBucket: The specified bucket does not exist ({})",
        name
    ))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `message`, as if the store were
    /// unreachable. `None` restores service.
    pub async fn set_unavailable(&self, message: Option<&str>) {
        self.inner.write().await.unavailable = message.map(str::to_string);
    }

    /// Make listings of `bucket` fail with `message`.
    pub async fn fail_listing(&self, bucket: &str, message: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.bucket_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        entry.listing_failure = Some(message.to_string());
        Ok(())
    }

    /// Payload currently stored at `bucket/key`, if any.
    pub async fn object_payload(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let inner = self.inner.read().await;
        inner
            .bucket(bucket)
            .and_then(|entry| entry.objects.get(key))
            .map(|stored| stored.payload.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, name: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        inner.check_available()?;
        Ok(inner.bucket(name).is_some())
    }

    async fn list_buckets(&self) -> StoreResult<Vec<Bucket>> {
        let inner = self.inner.read().await;
        inner.check_available()?;
        Ok(inner
            .buckets
            .iter()
            .map(|entry| entry.bucket.clone())
            .collect())
    }

    async fn make_bucket(&self, name: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.check_available()?;
        if inner.bucket(name).is_some() {
            return Err(StoreError::BucketAlreadyExists(name.to_string()));
        }
        inner.buckets.push(BucketEntry {
            bucket: Bucket::new(name, Some(Utc::now())),
            objects: BTreeMap::new(),
            listing_failure: None,
        });
        Ok(())
    }

    fn list_objects(&self, bucket: &str, prefix: &str, recursive: bool) -> ObjectStream {
        let inner = self.inner.clone();
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();

        // Snapshot taken on first poll, not at call time.
        stream::once(async move {
            let guard = inner.read().await;
            guard.check_available()?;
            let entry = guard.bucket(&bucket).ok_or_else(|| no_such_bucket(&bucket))?;
            if let Some(message) = &entry.listing_failure {
                return Err(StoreError::Backend(message.clone()));
            }
            let objects = entry
                .objects
                .values()
                .map(|stored| &stored.meta)
                .filter(|meta| meta.key.starts_with(&prefix))
                .filter(|meta| recursive || is_direct_child(&meta.key, &prefix))
                .cloned()
                .collect::<Vec<_>>();
            Ok::<_, StoreError>(objects)
        })
        .map_ok(|objects| stream::iter(objects.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        content_type: &str,
    ) -> StoreResult<Object> {
        let mut inner = self.inner.write().await;
        inner.check_available()?;
        let entry = inner.bucket_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        let meta = Object {
            key: key.to_string(),
            size_bytes: payload.len() as u64,
            last_modified: Some(Utc::now()),
            etag: Some(format!("{:x}", md5::compute(&payload))),
            content_type: Some(content_type.to_string()),
        };
        entry.objects.insert(
            key.to_string(),
            StoredObject {
                meta: meta.clone(),
                payload,
            },
        );
        Ok(meta)
    }
}
