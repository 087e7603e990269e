//! HTTP handlers for bucket-level operations.

use crate::{
    errors::AppError,
    models::report::iso_timestamp,
    services::gateway_service::GatewayService,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

/// Body of `POST /buckets`.
#[derive(Debug, Deserialize)]
pub struct CreateBucketReq {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BucketSummary {
    pub name: String,
    /// ISO-8601 creation time, `null` when the store doesn't report one.
    pub created: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListBucketsResp {
    pub buckets: Vec<BucketSummary>,
}

#[derive(Debug, Serialize)]
pub struct MessageResp {
    pub message: String,
}

/// GET `/buckets` — list all buckets.
pub async fn list_buckets(
    State(service): State<GatewayService>,
) -> Result<Json<ListBucketsResp>, AppError> {
    let buckets = service
        .list_buckets()
        .await?
        .into_iter()
        .map(|b| BucketSummary {
            created: b.created.as_ref().map(iso_timestamp),
            name: b.name,
        })
        .collect();

    Ok(Json(ListBucketsResp { buckets }))
}

/// POST `/buckets` — create a bucket, 409 if it already exists.
pub async fn create_bucket(
    State(service): State<GatewayService>,
    Json(payload): Json<CreateBucketReq>,
) -> Result<impl IntoResponse, AppError> {
    service.create_bucket(&payload.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResp {
            message: format!("Bucket '{}' created successfully", payload.name),
        }),
    ))
}
