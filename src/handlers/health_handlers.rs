//! Liveness & readiness handlers.
//!
//! - GET /        -> fixed liveness payload, never touches the store
//! - GET /readyz  -> readiness that checks the store answers a bucket listing

use crate::services::gateway_service::GatewayService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

pub const SERVICE_NAME: &str = "Minio API";
pub const SERVICE_VERSION: &str = "1.0.0";

/// `GET /`
///
/// Always returns 200 OK with the service name and version.
pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
        }),
    )
}

/// `GET /readyz`
///
/// HTTP 200 when the store answers a bucket listing, HTTP 503 otherwise.
pub async fn readyz(State(service): State<GatewayService>) -> impl IntoResponse {
    let store_check = match service.store().list_buckets().await {
        Ok(_) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(e) => {
            tracing::warn!("readiness check failed: {}", e);
            CheckStatus {
                ok: false,
                error: Some(e.to_string()),
            }
        }
    };

    let status = if store_check.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyResponse {
        status: if store_check.ok { "ok" } else { "error" },
        checks: HashMap::from([("store", store_check)]),
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
