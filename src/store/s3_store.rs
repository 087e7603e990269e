//! src/store/s3_store.rs
//!
//! S3Store — `ObjectStore` backed by a remote S3-compatible server through
//! `rust-s3`. MinIO is the expected peer, so requests use path-style
//! addressing against a custom endpoint.

use super::{ObjectStore, ObjectStream, StoreError, StoreResult, is_direct_child};
use crate::{
    config::StoreConfig,
    models::{bucket::Bucket, object::Object},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use s3::{
    Region, bucket::Bucket as S3Bucket, bucket_ops::BucketConfiguration, creds::Credentials,
    error::S3Error,
};
use tracing::debug;

const HTTP_CONFLICT: u16 = 409;

/// Handle to a remote store. Cheap to share; each call builds its own
/// request against the configured endpoint.
#[derive(Clone)]
pub struct S3Store {
    endpoint: String,
    region: Region,
    credentials: Credentials,
}

impl S3Store {
    pub fn new(cfg: &StoreConfig) -> StoreResult<Self> {
        let credentials = Credentials::new(
            Some(&cfg.access_key),
            Some(&cfg.secret_key),
            None,
            None,
            None,
        )
        .map_err(|err| StoreError::Backend(format!("invalid credentials: {}", err)))?;

        let endpoint = cfg.endpoint_url();
        let region = Region::Custom {
            region: cfg.region.clone(),
            endpoint: endpoint.clone(),
        };

        Ok(Self {
            endpoint,
            region,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn bucket_handle(&self, name: &str) -> StoreResult<Box<S3Bucket>> {
        let bucket = S3Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(bucket.with_path_style())
    }
}

impl From<S3Error> for StoreError {
    fn from(err: S3Error) -> Self {
        match err {
            S3Error::HttpFailWithBody(code, body) => StoreError::Backend(status_message(code, &body)),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, name: &str) -> StoreResult<bool> {
        let buckets = self.list_buckets().await?;
        Ok(buckets.iter().any(|b| b.name == name))
    }

    async fn list_buckets(&self) -> StoreResult<Vec<Bucket>> {
        let response = S3Bucket::list_buckets(self.region.clone(), self.credentials.clone()).await?;
        let buckets = response
            .buckets
            .bucket
            .into_iter()
            .map(|b| Bucket::new(b.name, parse_timestamp(&b.creation_date)))
            .collect::<Vec<_>>();
        debug!("store reported {} buckets", buckets.len());
        Ok(buckets)
    }

    async fn make_bucket(&self, name: &str) -> StoreResult<()> {
        let result = S3Bucket::create_with_path_style(
            name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => {
                debug!("created bucket {}", name);
                Ok(())
            }
            Err(S3Error::HttpFailWithBody(HTTP_CONFLICT, _)) => {
                Err(StoreError::BucketAlreadyExists(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn list_objects(&self, bucket: &str, prefix: &str, recursive: bool) -> ObjectStream {
        let handle = match self.bucket_handle(bucket) {
            Ok(handle) => handle,
            Err(err) => return stream::once(async move { Err(err) }).boxed(),
        };
        let prefix = prefix.to_string();
        let delimiter = (!recursive).then(|| "/".to_string());

        // `None` means the last page has been consumed; `Some(token)` is the
        // cursor for the next ListObjectsV2 request.
        let pages = stream::try_unfold(Some(None::<String>), move |cursor| {
            let handle = handle.clone();
            let prefix = prefix.clone();
            let delimiter = delimiter.clone();
            async move {
                let Some(token) = cursor else {
                    return Ok::<_, StoreError>(None);
                };
                let (page, _) = handle
                    .list_page(prefix.clone(), delimiter, token, None, None)
                    .await?;
                debug!(
                    "listed {} objects from {} (truncated: {})",
                    page.contents.len(),
                    handle.name(),
                    page.is_truncated
                );

                let next = match (page.is_truncated, page.next_continuation_token) {
                    (true, Some(token)) => Some(Some(token)),
                    _ => None,
                };
                let objects = page
                    .contents
                    .into_iter()
                    .filter(|obj| recursive || is_direct_child(&obj.key, &prefix))
                    .map(|obj| Object {
                        key: obj.key,
                        size_bytes: obj.size,
                        last_modified: parse_timestamp(&obj.last_modified),
                        etag: obj.e_tag.map(|tag| tag.trim_matches('"').to_string()),
                        content_type: None,
                    })
                    .collect::<Vec<_>>();
                Ok(Some((objects, next)))
            }
        });

        pages
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
        let handle = self.bucket_handle(bucket)?;
        let response = handle
            .put_object_with_content_type(key, &payload, content_type)
            .await?;

        let etag = response
            .headers()
            .get("etag")
            .map(|tag| tag.trim_matches('"').to_string());
        debug!("stored {}/{} ({} bytes)", bucket, key, payload.len());

        Ok(Object {
            key: key.to_string(),
            size_bytes: payload.len() as u64,
            last_modified: Some(Utc::now()),
            etag,
            content_type: Some(content_type.to_string()),
        })
    }
}

/// `<Code>: <Message>` from an S3 error document, else the raw body.
fn status_message(code: u16, body: &str) -> String {
    let detail = match (xml_text(body, "Code"), xml_text(body, "Message")) {
        (Some(kind), Some(message)) => format!("{}: {}", kind, message),
        (Some(kind), None) => kind.to_string(),
        _ => body.trim().to_string(),
    };
    if detail.is_empty() {
        format!("object store responded with status {}", code)
    } else {
        format!("object store responded with status {}: {}", code, detail)
    }
}

fn xml_text<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = start + body[start..].find(&close)?;
    Some(body[start..end].trim())
}

/// Parse an RFC 3339 timestamp as sent by the store; anything else is `None`.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
