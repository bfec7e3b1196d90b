//!
//! filehost HTTP server
//! --------------------
//! This module defines the Axum-based HTTP API for filehost.
//!
//! Responsibilities:
//! - Admin login/logout toggling the shared `SessionGate`.
//! - Admin-gated upload (multipart field `file`) and delete.
//! - Public listing and streaming download of stored files.
//!
//! The admin gate runs as route middleware so a closed gate answers 401 before
//! any upload body is read.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::files::FileHost;
use crate::identity::SessionGate;
use crate::storage::{FileStore, LocalDirStore};

mod handlers;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub files: FileHost,
    /// Upper bound on request body size, applied to uploads.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(gate: SessionGate, store: Arc<dyn FileStore>, max_upload_bytes: usize) -> Self {
        Self { files: FileHost::new(gate, store), max_upload_bytes }
    }
}

/// Build the full router for a given state.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/admin/upload", post(handlers::upload))
        .route("/api/admin/delete", post(handlers::delete_file))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(|| async { "filehost ok" }))
        .route("/api/admin/login", post(handlers::login))
        .route("/api/admin/logout", post(handlers::logout))
        .merge(admin)
        .route("/api/files", get(handlers::list_files))
        .route("/files/{name}", get(handlers::serve_file))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> AppResult<Response> {
    if let Err(e) = state.files.require_admin() {
        warn!(target: "filehost::http", "{} {} rejected: admin gate closed", req.method(), req.uri().path());
        return Err(e);
    }
    Ok(next.run(req).await)
}

/// Start the filehost HTTP server with the given configuration.
///
/// Ensures the upload directory exists, then serves until Ctrl-C.
pub async fn run_with_config(cfg: ServerConfig) -> anyhow::Result<()> {
    let store = LocalDirStore::new(&cfg.upload_dir)
        .with_context(|| format!("Failed to create or access upload dir: {}", cfg.upload_dir.display()))?;
    info!(
        target: "startup",
        "filehost starting: bind={}, upload_dir={:?}, max_upload_bytes={}",
        cfg.bind_addr(), store.root_path(), cfg.max_upload_bytes
    );

    let state = AppState::new(SessionGate::new(), Arc::new(store), cfg.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", cfg.bind_addr()))?;
    info!("Server running on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("filehost stopped");
    Ok(())
}

/// Convenience entry point using the default configuration.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(ServerConfig::default()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
