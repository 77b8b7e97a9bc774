//! In-process snapshot store.
//!
//! A stand-in for the real blob store (an S3 bucket in production): one
//! mutable JSON blob behind `GET`/`PUT /sensor-data.json`. Each `PUT` is a
//! full overwrite and each `GET` returns some fully written version, which
//! is all the coordination the pipeline needs with a single writer. Used by
//! the demo command and the integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{AquaError, Result};

/// Path of the single blob held by the store.
pub const BLOB_PATH: &str = "/sensor-data.json";

type Blob = Arc<RwLock<Option<String>>>;

/// Build the store router over a fresh empty blob.
pub fn router() -> Router {
    let blob: Blob = Arc::new(RwLock::new(None));
    Router::new()
        .route(BLOB_PATH, get(get_blob).put(put_blob))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(blob)
}

async fn get_blob(State(blob): State<Blob>) -> Response {
    let current = blob.read().ok().and_then(|guard| guard.clone());
    match current {
        Some(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_blob(State(blob): State<Blob>, body: String) -> StatusCode {
    match blob.write() {
        Ok(mut guard) => {
            *guard = Some(body);
            StatusCode::OK
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A running in-process store.
pub struct StoreHandle {
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl StoreHandle {
    /// URL of the blob, usable as both a poll target and a PUT target.
    pub fn blob_url(&self) -> String {
        format!("http://{}{}", self.addr, BLOB_PATH)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Bind and serve an empty store on the given address.
///
/// Pass port 0 to pick a free port; the bound address is available on the
/// returned handle. The server runs until the handle is dropped.
pub async fn serve(addr: &str) -> Result<StoreHandle> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AquaError::store_server(format!("failed to bind {}: {}", addr, e)))?;
    let addr = listener
        .local_addr()
        .map_err(|e| AquaError::store_server(e.to_string()))?;

    info!("snapshot store listening on http://{}{}", addr, BLOB_PATH);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!("store server error: {}", e);
        }
    });

    Ok(StoreHandle { addr, server })
}
