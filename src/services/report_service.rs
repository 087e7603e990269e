//! src/services/report_service.rs
//!
//! ReportService — builds the bucket inventory and archives it.
//!
//! The job is strictly sequential: `build_report`, then `archive`. A failure
//! while listing one bucket's objects is written into that bucket's section
//! and the walk continues. Failing to list buckets aborts before anything is
//! written; failing to ensure the output bucket or to upload aborts after the
//! local copy is saved.

use crate::{
    models::{
        bucket::Bucket,
        object::Object,
        report::{ReportDocument, iso_timestamp},
    },
    store::{ObjectStore, StoreError, StoreResult, collect_objects},
};
use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{path::PathBuf, sync::Arc};
use tokio::fs;
use tracing::{info, warn};

const REPORT_CONTENT_TYPE: &str = "text/plain";

/// Where a run writes its output.
#[derive(Debug, Clone)]
pub struct ReportJob {
    pub output_bucket: String,
    pub local_file: PathBuf,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct ReportOutcome {
    pub document: ReportDocument,
    pub bucket: String,
    pub remote_key: String,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ObjectStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Walk every bucket in store order and assemble the document.
    pub async fn build_report(&self, generated_at: DateTime<Utc>) -> StoreResult<ReportDocument> {
        let buckets = self.store.list_buckets().await?;
        let mut body = Vec::new();

        for bucket in &buckets {
            let listing = collect_objects(self.store.list_objects(&bucket.name, "", true)).await;
            if let Err(err) = &listing {
                warn!("listing bucket {} failed: {}", bucket.name, err);
            }
            body.extend(bucket_section(bucket, listing));
        }

        info!("inventory covers {} buckets", buckets.len());
        Ok(ReportDocument::new(generated_at, body))
    }

    /// Create `name` if missing. Returns whether this call created it.
    ///
    /// A conflict from a concurrent creator counts as "already there".
    pub async fn ensure_bucket(&self, name: &str) -> StoreResult<bool> {
        if self.store.bucket_exists(name).await? {
            return Ok(false);
        }
        match self.store.make_bucket(name).await {
            Ok(()) => {
                info!("created bucket {}", name);
                Ok(true)
            }
            Err(StoreError::BucketAlreadyExists(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Archive a built document: save locally, ensure the output bucket,
    /// upload. Any failure here is fatal to the run.
    pub async fn archive(&self, job: &ReportJob, document: ReportDocument) -> Result<ReportOutcome> {
        let rendered = document.render();

        fs::write(&job.local_file, &rendered)
            .await
            .with_context(|| format!("writing report to {}", job.local_file.display()))?;
        info!("saved locally: {}", job.local_file.display());

        self.ensure_bucket(&job.output_bucket)
            .await
            .with_context(|| format!("ensuring bucket `{}`", job.output_bucket))?;

        let remote_key = document.remote_key(&job.local_file);
        self.store
            .put_object(
                &job.output_bucket,
                &remote_key,
                Bytes::from(rendered),
                REPORT_CONTENT_TYPE,
            )
            .await
            .with_context(|| format!("uploading s3://{}/{}", job.output_bucket, remote_key))?;
        info!("uploaded s3://{}/{}", job.output_bucket, remote_key);

        Ok(ReportOutcome {
            document,
            bucket: job.output_bucket.clone(),
            remote_key,
        })
    }
}

/// Lines for one bucket: header, creation time, then objects, `(empty)`, or
/// the listing error.
fn bucket_section(bucket: &Bucket, listing: StoreResult<Vec<Object>>) -> Vec<String> {
    let created = bucket
        .created
        .as_ref()
        .map(iso_timestamp)
        .unwrap_or_else(|| "unknown".into());

    let mut lines = vec![
        format!("BUCKET: {}", bucket.name),
        format!("  Created: {}", created),
        "  Objects:".to_string(),
    ];
    match listing {
        Ok(objects) if objects.is_empty() => lines.push("    (empty)".into()),
        Ok(objects) => lines.extend(
            objects
                .iter()
                .map(|obj| format!("    - {}  ({} bytes)", obj.key, obj.size_bytes)),
        ),
        Err(err) => lines.push(format!("    Error: {}", err)),
    }
    lines.push(String::new());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn run_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    /// Buckets `A: [x (10 bytes)]` and `B: []`, created in that order.
    async fn fixture() -> MemoryStore {
        let store = MemoryStore::new();
        store.make_bucket("A").await.unwrap();
        store.make_bucket("B").await.unwrap();
        store
            .put_object("A", "x", Bytes::from_static(b"0123456789"), "text/plain")
            .await
            .unwrap();
        store
    }

    fn position(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|l| l == needle)
            .unwrap_or_else(|| panic!("missing line {needle:?}"))
    }

    #[tokio::test]
    async fn sections_follow_store_order() {
        let store = fixture().await;
        let svc = ReportService::new(Arc::new(store));
        let doc = svc.build_report(run_time()).await.unwrap();
        let lines = doc.lines();

        let a = position(lines, "BUCKET: A");
        let x = position(lines, "    - x  (10 bytes)");
        let b = position(lines, "BUCKET: B");
        let empty = position(lines, "    (empty)");
        assert!(a < x && x < b && b < empty);
        assert_eq!(lines[1], "Generated: 2025-01-02T03:04:05Z");
    }

    #[tokio::test]
    async fn failing_bucket_is_degraded_not_fatal() {
        let store = fixture().await;
        store.fail_listing("A", "Access Denied").await.unwrap();
        let svc = ReportService::new(Arc::new(store));
        let lines = svc.build_report(run_time()).await.unwrap().lines().to_vec();

        let a = position(&lines, "BUCKET: A");
        let err = position(&lines, "    Error: Access Denied");
        let b = position(&lines, "BUCKET: B");
        assert!(a < err && err < b);
        assert!(lines[b..].contains(&"    (empty)".to_string()));
    }

    #[test]
    fn unknown_creation_time_is_spelled_out() {
        let bucket = Bucket::new("legacy", None);
        let lines = bucket_section(&bucket, Ok(Vec::new()));
        assert_eq!(lines[1], "  Created: unknown");
        assert_eq!(lines.last().map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn ensure_bucket_is_idempotent() {
        let store = MemoryStore::new();
        let svc = ReportService::new(Arc::new(store.clone()));
        assert!(svc.ensure_bucket("reports").await.unwrap());
        assert!(!svc.ensure_bucket("reports").await.unwrap());
        assert_eq!(store.list_buckets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_saves_locally_and_uploads_under_timestamped_key() {
        let store = fixture().await;
        let svc = ReportService::new(Arc::new(store.clone()));
        let dir = std::env::temp_dir().join(format!("inventory-run-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        let job = ReportJob {
            output_bucket: "reports".into(),
            local_file: dir.join("bucket-objects-report.txt"),
        };

        let document = svc.build_report(run_time()).await.unwrap();
        let outcome = svc.archive(&job, document).await.unwrap();
        assert_eq!(
            outcome.remote_key,
            "reports/20250102_030405_bucket-objects-report.txt"
        );

        let local = fs::read_to_string(&job.local_file).await.unwrap();
        assert_eq!(local, outcome.document.render());
        let remote = store
            .object_payload("reports", &outcome.remote_key)
            .await
            .unwrap();
        assert_eq!(remote, Bytes::from(local));

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn outage_while_listing_buckets_is_fatal() {
        let store = fixture().await;
        store.set_unavailable(Some("connection reset")).await;
        let svc = ReportService::new(Arc::new(store));

        let err = svc.build_report(run_time()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn failed_upload_still_leaves_local_copy() {
        let store = fixture().await;
        let svc = ReportService::new(Arc::new(store.clone()));
        let dir = std::env::temp_dir().join(format!("inventory-fail-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        let job = ReportJob {
            output_bucket: "reports".into(),
            local_file: dir.join("bucket-objects-report.txt"),
        };

        let document = svc.build_report(run_time()).await.unwrap();
        let rendered = document.render();
        store.set_unavailable(Some("connection reset")).await;

        let err = svc.archive(&job, document).await.unwrap_err();
        assert!(format!("{:#}", err).contains("connection reset"));
        assert_eq!(fs::read_to_string(&job.local_file).await.unwrap(), rendered);

        store.set_unavailable(None).await;
        assert!(!store.bucket_exists("reports").await.unwrap());

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
