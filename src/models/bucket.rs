//! Represents a bucket as reported by the object store.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A top-level container for objects.
///
/// Identity is the name. The creation timestamp is optional because not every
/// store reports it in bucket listings.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name, unique within the store.
    pub name: String,

    /// When this bucket was created, if the store says so.
    pub created: Option<DateTime<Utc>>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, created: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            created,
        }
    }
}
