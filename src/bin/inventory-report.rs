//! One-shot job: inventory every bucket, save the report locally, and
//! archive it under `reports/` in the output bucket.

use anyhow::{Context, Result};
use chrono::Utc;
use minio_gateway::{
    config::ReportConfig,
    services::report_service::{ReportJob, ReportService},
    store::S3Store,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ReportConfig::from_env_and_args()?;
    let store = S3Store::new(&cfg.store).context("configuring store client")?;
    tracing::info!("Connecting to Minio at {} ...", store.endpoint());

    let service = ReportService::new(Arc::new(store));
    let job = ReportJob {
        output_bucket: cfg.output_bucket.clone(),
        local_file: cfg.local_file.clone(),
    };

    let document = service
        .build_report(Utc::now())
        .await
        .context("listing buckets")?;
    tracing::info!("Report built ({} lines)", document.lines().len());
    println!("{}", document.render());

    let outcome = service.archive(&job, document).await?;
    tracing::info!(
        "Done. Report is at s3://{}/{}",
        outcome.bucket,
        outcome.remote_key
    );

    Ok(())
}
