//! Represents an object (file) stored in a bucket.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// MIME type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata of a single object within a bucket.
///
/// Identity is `(bucket, key)`; the bucket is implied by the call that
/// produced the value. The struct never carries payload bytes.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Object {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes.
    pub size_bytes: u64,

    /// Timestamp when the object was last written.
    pub last_modified: Option<DateTime<Utc>>,

    /// Opaque content digest reported by the store.
    pub etag: Option<String>,

    /// Content type (MIME type). Listings don't report it, so only objects
    /// returned from a write carry one.
    pub content_type: Option<String>,
}

/// A fully buffered upload headed for `put_object`. The target bucket travels
/// separately, as proof that its existence was checked.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    /// Client-supplied filename, used verbatim as the object key.
    pub key: String,
    pub payload: bytes::Bytes,
    pub content_type: String,
}
