//! Defines the gateway's HTTP surface.
//!
//! ## Structure
//! - `GET  /`                          — liveness
//! - `GET  /readyz`                    — readiness (store reachable)
//! - `GET  /buckets`                   — list buckets
//! - `POST /buckets`                   — create bucket
//! - `GET  /buckets/{bucket}/objects`  — list objects (supports `prefix`)
//! - `POST /buckets/{bucket}/objects`  — upload object (multipart `file`)

use crate::{
    handlers::{
        bucket_handlers::{create_bucket, list_buckets},
        health_handlers::{readyz, root},
        object_handlers::{list_objects, upload_object},
    },
    services::gateway_service::GatewayService,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router for all gateway routes.
///
/// The router carries shared state (`GatewayService`) to all handlers.
/// CORS is fully permissive and uploads have no body size cap.
pub fn routes() -> Router<GatewayService> {
    Router::new()
        .route("/", get(root))
        .route("/readyz", get(readyz))
        .route("/buckets", get(list_buckets).post(create_bucket))
        .route(
            "/buckets/{bucket}/objects",
            get(list_objects).post(upload_object),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
