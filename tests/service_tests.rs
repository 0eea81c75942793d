//! HTTP surface tests driven through the router directly, no sockets.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use brunogen::cache::MemoryArtifactStore;
use brunogen::service::{router, ServiceState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    router(ServiceState {
        store: Arc::new(MemoryArtifactStore::default()),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn generate_then_download_each_file_type() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({
                "collectionName": "Service Test",
                "dataQueries": [
                    {"name": "Q", "endpoint": "/client-data", "query": "SELECT 1 AS VALUE, 'K' AS KEY", "variableName": "clientId"}
                ],
                "variableGenerators": [
                    {"name": "correlationId", "type": "correlationId"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["collectionName"], "Service Test");
    assert_eq!(body["expiresIn"], "1 hour");
    let id = body["collectionId"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 32);
    assert_eq!(
        body["downloadUrl"].as_str().unwrap(),
        format!("/api/download/{}", id)
    );

    for (file_type, mime, file_name) in [
        ("collection", "application/json", "Service-Test.json"),
        ("app", "application/javascript", "app.js"),
        ("package", "application/json", "package.json"),
        ("instructions", "text/markdown", "BRUNO_SETUP_INSTRUCTIONS.md"),
    ] {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/download/{}/{}", id, file_type)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "file type {}", file_type);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            mime
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains(file_name), "{}", disposition);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(!bytes.is_empty());
    }
}

#[tokio::test]
async fn download_all_bundles_the_four_files() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({"collectionName": "Bundle Test"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["collectionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/download/{}/all", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let files = body["files"].as_object().unwrap();
    assert_eq!(files.len(), 4);
    for name in [
        "Bundle-Test.json",
        "app.js",
        "package.json",
        "BRUNO_SETUP_INSTRUCTIONS.md",
    ] {
        assert!(!files[name].as_str().unwrap().is_empty(), "missing {}", name);
    }

    let response = app
        .clone()
        .oneshot(get("/api/download/deadbeefdeadbeefdeadbeefdeadbeef/all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn info_then_delete_removes_the_collection() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({"collectionName": "Short Lived"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["collectionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/collection/{}/info", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let info = body_json(response).await;
    assert_eq!(info["collectionName"], "Short Lived");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/collection/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/collection/{}/info", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_collection_and_file_type_are_not_found() {
    let app = app();

    let response = app
        .clone()
        .oneshot(get("/api/download/deadbeefdeadbeefdeadbeefdeadbeef/collection"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let response = app
        .clone()
        .oneshot(post_json("/api/generate", json!({"collectionName": "X"})))
        .await
        .unwrap();
    let id = body_json(response).await["collectionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/download/{}/tarball", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_config_is_a_client_error() {
    let response = app()
        .oneshot(post_json(
            "/api/generate",
            json!({"collectionName": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Collection name"));
}

#[tokio::test]
async fn db_connection_test_is_simulated() {
    let response = app()
        .oneshot(post_json(
            "/api/test-db-connection",
            json!({
                "jdbcUrl": "jdbc:sqlserver://db.example.com:1433;databaseName=CRM",
                "username": "CLIENTUSER",
                "password": "secret"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = app()
        .oneshot(post_json(
            "/api/test-db-connection",
            json!({"jdbcUrl": "mysql://nope", "username": "u", "password": "p"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}
