//! src/services/gateway_service.rs
//!
//! GatewayService — bucket and object operations behind the HTTP handlers.
//! Every operation that assumes a bucket first asks the store whether it
//! exists; nothing is cached between calls. Check-then-act sequences are not
//! atomic, so two concurrent creators of the same bucket may both pass the
//! check; the loser then sees the store's own conflict.

use crate::{
    models::{
        bucket::Bucket,
        object::{Object, UploadRequest},
    },
    store::{ObjectStore, StoreError, collect_objects},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Bucket '{0}' not found")]
    BucketNotFound(String),
    #[error("Bucket '{0}' already exists")]
    BucketAlreadyExists(String),
    #[error("{0}")]
    InvalidUpload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A bucket name that the store confirmed to exist moments ago.
///
/// Only [`GatewayService::require_bucket`] hands these out, so object
/// operations cannot be issued without the existence check.
#[derive(Debug, Clone)]
pub struct CheckedBucket(String);

impl CheckedBucket {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Stateless request-level operations over a shared store handle.
#[derive(Clone)]
pub struct GatewayService {
    store: Arc<dyn ObjectStore>,
}

impl GatewayService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub async fn list_buckets(&self) -> GatewayResult<Vec<Bucket>> {
        Ok(self.store.list_buckets().await?)
    }

    /// Create `name` unless it already exists. No mutation happens when the
    /// check finds it.
    pub async fn create_bucket(&self, name: &str) -> GatewayResult<()> {
        if self.store.bucket_exists(name).await? {
            info!("bucket {} already exists, not creating", name);
            return Err(GatewayError::BucketAlreadyExists(name.to_string()));
        }

        match self.store.make_bucket(name).await {
            Ok(()) => {
                info!("created bucket {}", name);
                Ok(())
            }
            Err(StoreError::BucketAlreadyExists(_)) => {
                info!("bucket {} was created concurrently", name);
                Err(GatewayError::BucketAlreadyExists(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Existence check that gates every object operation.
    pub async fn require_bucket(&self, name: &str) -> GatewayResult<CheckedBucket> {
        if self.store.bucket_exists(name).await? {
            Ok(CheckedBucket(name.to_string()))
        } else {
            debug!("bucket {} not found", name);
            Err(GatewayError::BucketNotFound(name.to_string()))
        }
    }

    /// Recursive listing under `prefix`, materialized in full.
    pub async fn list_objects(
        &self,
        bucket: &CheckedBucket,
        prefix: &str,
    ) -> GatewayResult<Vec<Object>> {
        let stream = self.store.list_objects(bucket.name(), prefix, true);
        Ok(collect_objects(stream).await?)
    }

    /// Write the upload under its client-supplied key; last write wins.
    pub async fn upload_object(
        &self,
        bucket: &CheckedBucket,
        upload: UploadRequest,
    ) -> GatewayResult<Object> {
        if upload.key.is_empty() {
            return Err(GatewayError::InvalidUpload(
                "uploaded file has no filename".into(),
            ));
        }
        let size = upload.payload.len();
        let object = self
            .store
            .put_object(
                bucket.name(),
                &upload.key,
                upload.payload,
                &upload.content_type,
            )
            .await?;
        info!("uploaded {} ({} bytes) to {}", upload.key, size, bucket.name());
        Ok(object)
    }
}
