//! HTTP handlers for object operations inside a bucket.
//! Uploads are buffered in memory in full before they reach the store.

use crate::{
    errors::AppError,
    models::{
        object::{DEFAULT_CONTENT_TYPE, UploadRequest},
        report::iso_timestamp,
    },
    services::gateway_service::{GatewayError, GatewayService},
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

/// Name of the multipart field carrying the file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ListObjectsQuery {
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListObjectsResp {
    pub bucket: String,
    pub prefix: String,
    pub objects: Vec<ObjectSummary>,
}

#[derive(Debug, Serialize)]
pub struct UploadResp {
    pub message: String,
    pub object_name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// GET `/buckets/{bucket}/objects?prefix=` — recursive listing, 404 if the
/// bucket is missing.
pub async fn list_objects(
    State(service): State<GatewayService>,
    Path(bucket): Path<String>,
    Query(q): Query<ListObjectsQuery>,
) -> Result<Json<ListObjectsResp>, AppError> {
    let checked = service.require_bucket(&bucket).await?;
    let prefix = q.prefix.unwrap_or_default();

    let objects = service
        .list_objects(&checked, &prefix)
        .await?
        .into_iter()
        .map(|obj| ObjectSummary {
            last_modified: obj.last_modified.as_ref().map(iso_timestamp),
            name: obj.key,
            size_bytes: obj.size_bytes,
            etag: obj.etag,
        })
        .collect();

    Ok(Json(ListObjectsResp {
        bucket,
        prefix,
        objects,
    }))
}

/// POST `/buckets/{bucket}/objects` — upload the `file` field under its
/// client filename. The bucket is checked before the body is read.
pub async fn upload_object(
    State(service): State<GatewayService>,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let checked = service.require_bucket(&bucket).await?;
    let upload = read_file_field(&mut multipart).await?;
    let content_type = upload.content_type.clone();

    let object = service.upload_object(&checked, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResp {
            message: format!("'{}' uploaded to bucket '{}'", object.key, bucket),
            object_name: object.key,
            size_bytes: object.size_bytes,
            content_type,
        }),
    ))
}

/// Pull the first `file` field out of the form, buffering it whole.
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadRequest, GatewayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| GatewayError::InvalidUpload(err.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let key = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let payload = field
            .bytes()
            .await
            .map_err(|err| GatewayError::InvalidUpload(err.to_string()))?;

        return Ok(UploadRequest {
            key,
            payload,
            content_type,
        });
    }

    Err(GatewayError::InvalidUpload(format!(
        "multipart field `{}` is required",
        FILE_FIELD
    )))
}
