//! Integration tests for the query orchestration pipeline.
//!
//! Each test spins up a stub search backend on an ephemeral port and drives
//! the real handlers against it; no external services are required.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use course_search::api::pages::{saved_results_json, saved_results_page};
use course_search::api::query::submit_query;
use course_search::backend::BackendClient;
use course_search::config::{BackendConfig, Config};
use course_search::models::QueryRequest;
use course_search::state::AppState;
use course_search::store::ResultStore;

/// Serve `router` on an ephemeral port, returning its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Stub backend: healthy, answers every query with `payload`, counts hits.
fn stub_backend(payload: serde_json::Value, hits: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy"})) }),
        )
        .route(
            "/query",
            post(move |Json(_body): Json<serde_json::Value>| {
                let hits = hits.clone();
                let payload = payload.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(payload)
                }
            }),
        )
}

fn test_config(backend_url: &str, results_dir: &Path) -> Config {
    let mut config = Config::default();
    config.results_dir = results_dir.to_path_buf();
    config.backend = BackendConfig {
        base_url: backend_url.to_string(),
        connect_timeout_secs: 2,
        health_timeout_secs: 2,
        query_timeout_secs: 5,
    };
    config
}

fn app_state(backend_url: &str, results_dir: &Path) -> AppState {
    AppState::new(test_config(backend_url, results_dir)).unwrap()
}

fn request(query: &str) -> Json<QueryRequest> {
    Json(QueryRequest {
        query: query.to_string(),
        timestamp: None,
    })
}

fn two_courses() -> serde_json::Value {
    json!([
        {"title": "Intro to Machine Learning", "provider": "Coursera", "skills": ["python", "ml"]},
        {"title": "Practical Deep Learning", "provider": "fast.ai", "price": "Free"}
    ])
}

#[tokio::test]
async fn test_query_round_trip_through_store() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = spawn_backend(stub_backend(json!({"results": two_courses()}), hits)).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&url, dir.path());

    let Json(resp) = submit_query(State(state.clone()), request("intro to machine learning"))
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.total_results, 2);
    let ts = resp.timestamp.expect("results should have been persisted");

    // Round-trip identity: load returns exactly what search returned
    let loaded = state.store.load(&ts).unwrap();
    assert_eq!(loaded, resp.results);
}

#[tokio::test]
async fn test_empty_query_never_contacts_backend() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = spawn_backend(stub_backend(two_courses(), hits.clone())).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&url, dir.path());

    let (status, Json(body)) = submit_query(State(state), request("   "))
        .await
        .unwrap_err();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.success);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_backend_unavailable_maps_to_503_and_nothing_persisted() {
    // Bind then immediately drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&url, dir.path());

    let (status, Json(body)) = submit_query(State(state.clone()), request("rust courses"))
        .await
        .unwrap_err();

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body.success);
    assert!(state.store.list().is_empty());
}

#[tokio::test]
async fn test_backend_error_status_is_mirrored() {
    let router = Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy"})) }),
        )
        .route(
            "/query",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"success": false, "error": "no courses matched"})),
                )
            }),
        );
    let url = spawn_backend(router).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(&url, dir.path());

    let (status, Json(body)) = submit_query(State(state), request("quantum basket weaving"))
        .await
        .unwrap_err();

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body.error, "no courses matched");
}

#[tokio::test]
async fn test_slow_backend_maps_to_504() {
    let router = Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy"})) }),
        )
        .route(
            "/query",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!({"results": []}))
            }),
        );
    let url = spawn_backend(router).await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = test_config(&url, dir.path());
    config.backend.query_timeout_secs = 1;
    let state = AppState::new(config).unwrap();

    let (status, _) = submit_query(State(state), request("slow query"))
        .await
        .unwrap_err();

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_wrapped_and_bare_response_shapes_are_equivalent() {
    let hits = Arc::new(AtomicUsize::new(0));
    let wrapped_url =
        spawn_backend(stub_backend(json!({"results": two_courses()}), hits.clone())).await;
    let bare_url = spawn_backend(stub_backend(two_courses(), hits)).await;
    let dir = tempfile::tempdir().unwrap();

    let Json(from_wrapped) = submit_query(
        State(app_state(&wrapped_url, dir.path())),
        request("machine learning"),
    )
    .await
    .unwrap();
    let Json(from_bare) = submit_query(
        State(app_state(&bare_url, dir.path())),
        request("machine learning"),
    )
    .await
    .unwrap();

    assert_eq!(from_wrapped.results, from_bare.results);
    assert_eq!(from_wrapped.total_results, 2);
}

#[tokio::test]
async fn test_persistence_failure_still_returns_results() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = spawn_backend(stub_backend(json!({"results": two_courses()}), hits)).await;

    // A plain file where the results root should be makes every save fail
    let dir = tempfile::tempdir().unwrap();
    let blocked_root = dir.path().join("results");
    std::fs::write(&blocked_root, "occupied").unwrap();

    let config = test_config(&url, &blocked_root);
    let state = AppState {
        backend: BackendClient::new(config.backend.clone()).unwrap(),
        store: Arc::new(ResultStore::new(&blocked_root)),
        config,
    };

    let Json(resp) = submit_query(State(state), request("intro to ml"))
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.total_results, 2);
    assert!(resp.timestamp.is_none());
}

#[tokio::test]
async fn test_unknown_timestamp_renders_empty_page() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state("http://localhost:1", dir.path());

    let Html(page) = saved_results_page(
        State(state),
        UrlPath("does-not-exist-timestamp".to_string()),
    )
    .await;

    assert!(page.contains("INITIAL_RESULTS = []"));
}

#[tokio::test]
async fn test_saved_page_embeds_persisted_results() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state("http://localhost:1", dir.path());

    let courses: Vec<course_search::models::Course> =
        serde_json::from_value(two_courses()).unwrap();
    let ts = state.store.save("intro to ml", &courses).unwrap();

    let Html(page) = saved_results_page(State(state), UrlPath(ts.into_inner())).await;

    assert!(page.contains("Intro to Machine Learning"));
    assert!(page.contains("Practical Deep Learning"));
}

#[tokio::test]
async fn test_saved_results_json_reports_404_for_unknown_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state("http://localhost:1", dir.path());

    let (status, Json(body)) =
        saved_results_json(State(state), UrlPath("20990101T000000Z".to_string()))
            .await
            .unwrap_err();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.success);
}

#[tokio::test]
async fn test_saved_results_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state("http://localhost:1", dir.path());

    let courses: Vec<course_search::models::Course> =
        serde_json::from_value(two_courses()).unwrap();
    let ts = state.store.save("intro to ml", &courses).unwrap();

    let Json(resp) = saved_results_json(State(state), UrlPath(ts.as_str().to_string()))
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.timestamp, ts.as_str());
    assert_eq!(resp.results, courses);
}
