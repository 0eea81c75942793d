//! HTTP surface of the generation service.
//!
//! Thin layer over [`crate::packaging::generate`] and the artifact cache:
//! generate, download, inspect, delete. Every failure becomes a
//! `{success: false, error}` JSON body; nothing panics across a handler.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::cache::{file_for_download, ArtifactStore};
use crate::config::GenerationConfig;
use crate::packaging;

#[derive(Clone)]
pub struct ServiceState {
    pub store: Arc<dyn ArtifactStore>,
}

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate", post(generate_collection))
        .route("/api/download/:collection_id/all", get(download_all))
        .route("/api/download/:collection_id/:file_type", get(download_file))
        .route("/api/collection/:collection_id", delete(delete_collection))
        .route("/api/collection/:collection_id/info", get(collection_info))
        .route("/api/test-db-connection", post(test_db_connection))
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(port: u16, state: ServiceState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("Generation service listening on port {}", port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn generate_collection(
    State(state): State<ServiceState>,
    Json(config): Json<GenerationConfig>,
) -> impl IntoResponse {
    log::info!("Generating collection: {}", config.collection_name);

    match packaging::generate(&config) {
        Ok(artifacts) => {
            let collection_name = config.collection_name.clone();
            let id = state.store.insert(collection_name.clone(), artifacts).await;
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Collection generated successfully",
                    "collectionId": id,
                    "collectionName": collection_name,
                    "expiresIn": "1 hour",
                    "downloadUrl": format!("/api/download/{}", id),
                })),
            )
        }
        Err(e) => {
            log::error!("Generation failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

async fn download_file(
    State(state): State<ServiceState>,
    Path((collection_id, file_type)): Path<(String, String)>,
) -> axum::response::Response {
    let Some(stored) = state.store.get(&collection_id).await else {
        return not_found("Collection not found or expired");
    };
    match file_for_download(&stored, &file_type) {
        Ok((file_name, content, mime)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ],
            content,
        )
            .into_response(),
        Err(e) => not_found(&e.to_string()),
    }
}

/// All four files in one JSON object, for client-side archive creation.
async fn download_all(
    State(state): State<ServiceState>,
    Path(collection_id): Path<String>,
) -> axum::response::Response {
    let Some(stored) = state.store.get(&collection_id).await else {
        return not_found("Collection not found or expired");
    };

    let artifacts = &stored.artifacts;
    let mut files = serde_json::Map::new();
    files.insert(
        artifacts.collection_file_name.clone(),
        artifacts.collection.clone().into(),
    );
    files.insert(
        crate::packaging::GeneratedArtifacts::MOCK_SERVER_FILE.to_string(),
        artifacts.mock_server.clone().into(),
    );
    files.insert(
        crate::packaging::GeneratedArtifacts::MANIFEST_FILE.to_string(),
        artifacts.manifest.clone().into(),
    );
    files.insert(
        crate::packaging::GeneratedArtifacts::INSTRUCTIONS_FILE.to_string(),
        artifacts.instructions.clone().into(),
    );

    Json(json!({ "success": true, "files": files })).into_response()
}

async fn delete_collection(
    State(state): State<ServiceState>,
    Path(collection_id): Path<String>,
) -> axum::response::Response {
    if state.store.remove(&collection_id).await {
        Json(json!({ "success": true, "message": "Collection deleted" })).into_response()
    } else {
        not_found("Collection not found or expired")
    }
}

async fn collection_info(
    State(state): State<ServiceState>,
    Path(collection_id): Path<String>,
) -> axum::response::Response {
    match state.store.get(&collection_id).await {
        Some(stored) => Json(json!({
            "success": true,
            "collectionId": collection_id,
            "collectionName": stored.collection_name,
            "ageSeconds": stored.age().as_secs(),
            "files": ["collection", "app", "package", "instructions"],
        }))
        .into_response(),
        None => not_found("Collection not found or expired"),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DbConnectionRequest {
    #[serde(default)]
    jdbc_url: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Simulated connection test: shape validation and an artificial delay
/// only. Real database connectivity is out of scope.
async fn test_db_connection(Json(request): Json<DbConnectionRequest>) -> impl IntoResponse {
    if !request.jdbc_url.starts_with("jdbc:") {
        return Json(json!({
            "success": false,
            "error": "Invalid JDBC URL format. Must start with \"jdbc:\"",
        }));
    }
    if request.username.is_empty() || request.password.is_empty() {
        return Json(json!({
            "success": false,
            "error": "Username and password are required",
        }));
    }

    tokio::time::sleep(std::time::Duration::from_millis(250)).await;

    Json(json!({
        "success": true,
        "message": "Database connection test successful",
        "connectionInfo": {
            "username": request.username,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        },
    }))
}

fn not_found(message: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}
