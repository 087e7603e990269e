use anyhow::{Context, Result};
use axum::Router;
use minio_gateway::{
    config::GatewayConfig,
    routes,
    services::gateway_service::GatewayService,
    store::{MemoryStore, ObjectStore, S3Store},
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = GatewayConfig::from_env_and_args()?;
    tracing::info!(
        "Starting minio-gateway on {} (store endpoint {})",
        cfg.addr(),
        cfg.store.endpoint_url()
    );

    // --- Store client, shared by every request ---
    let store: Arc<dyn ObjectStore> = if cfg.in_memory {
        tracing::warn!("Serving from an in-memory store; nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(S3Store::new(&cfg.store).context("configuring store client")?)
    };
    let service = GatewayService::new(store);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr)
                .await
                .with_context(|| format!("binding {}", fallback_addr))?
        }
        Err(err) => return Err(err).with_context(|| format!("binding {}", addr)),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
