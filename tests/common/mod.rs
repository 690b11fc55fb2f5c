//! Test registry server.
//!
//! Serves the registry HTTP API from an [`InMemoryRegistry`] with the status
//! codes the real backend uses: `201` on create, `409` with a plain-text
//! body on duplicates, and a JSON error envelope for other failures.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use source_registry::api::InMemoryRegistry;
use source_registry::api::RegistryApi;
use source_registry::error::RegistryError;
use source_registry::models::{Settings, SourceDraft};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start `app` on an ephemeral port.
pub async fn spawn_router(app: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{}", addr),
        handle,
    }
}

/// Start a registry API server backed by `registry`.
pub async fn spawn_registry(registry: Arc<InMemoryRegistry>) -> TestServer {
    let app = Router::new()
        .route("/api/sources", get(list_sources).post(create_source))
        .route("/api/sources/{id}", delete(delete_source))
        .route("/api/sources/{id}/resync", post(resync_source))
        .route("/api/settings", get(get_settings).put(put_settings))
        .with_state(registry);
    spawn_router(app).await
}

/// Base URL of a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

struct ApiError(RegistryError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .status_code()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let reason = match &self.0 {
            RegistryError::Status { reason, .. } => reason.clone(),
            other => other.reason().to_string(),
        };

        if reason.is_empty() {
            status.into_response()
        } else if status == StatusCode::CONFLICT {
            (status, format!("{}\n", reason)).into_response()
        } else {
            let body = json!({
                "error": { "code": "INTERNAL_ERROR", "message": reason },
                "correlationId": "test",
            });
            (status, Json(body)).into_response()
        }
    }
}

async fn list_sources(
    State(registry): State<Arc<InMemoryRegistry>>,
) -> Result<Response, ApiError> {
    let sources = registry.list_sources().await.map_err(ApiError)?;
    Ok(Json(sources).into_response())
}

async fn create_source(
    State(registry): State<Arc<InMemoryRegistry>>,
    Json(draft): Json<SourceDraft>,
) -> Result<Response, ApiError> {
    let created = registry.create_source(&draft).await.map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn delete_source(
    State(registry): State<Arc<InMemoryRegistry>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    registry.delete_source(&id).await.map_err(ApiError)?;
    Ok(StatusCode::OK)
}

async fn resync_source(
    State(registry): State<Arc<InMemoryRegistry>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    registry.resync_source(&id).await.map_err(ApiError)?;
    Ok(StatusCode::OK)
}

async fn get_settings(
    State(registry): State<Arc<InMemoryRegistry>>,
) -> Result<Json<Settings>, ApiError> {
    registry.get_settings().await.map(Json).map_err(ApiError)
}

async fn put_settings(
    State(registry): State<Arc<InMemoryRegistry>>,
    Json(settings): Json<Settings>,
) -> Result<StatusCode, ApiError> {
    registry.update_settings(&settings).await.map_err(ApiError)?;
    Ok(StatusCode::OK)
}
