use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

use crate::models::{Course, ErrorBody, ResultsListResponse, SavedResultsResponse};
use crate::state::AppState;

const INDEX_SHELL: &str = include_str!("../../static/index.html");

/// Placeholder in the shell that gets replaced with the bootstrapped
/// result-set JSON.
const RESULTS_MARKER: &str = "/*__RESULTS__*/[]";

/// Render the page shell with `results` spliced in.
fn render_page(results: &[Course]) -> Html<String> {
    let payload = serde_json::to_string(results)
        .unwrap_or_else(|_| "[]".to_string())
        // keep embedded JSON from terminating the script tag early
        .replace("</", "<\\/");
    Html(INDEX_SHELL.replace(RESULTS_MARKER, &payload))
}

/// GET / - landing page with an empty result set
pub async fn landing() -> Html<String> {
    render_page(&[])
}

/// GET /{timestamp} - re-render previously persisted results. A dead or
/// mistyped link degrades to the empty-results page, never a hard failure.
pub async fn saved_results_page(
    State(state): State<AppState>,
    Path(timestamp): Path<String>,
) -> Html<String> {
    match state.store.load(&timestamp) {
        Ok(results) => render_page(&results),
        Err(e) => {
            tracing::warn!("Could not load results for '{timestamp}': {e}");
            render_page(&[])
        }
    }
}

/// GET /results - list persisted timestamps, newest first
pub async fn list_saved(State(state): State<AppState>) -> Json<ResultsListResponse> {
    let available_results = state.store.list();
    let total_count = available_results.len();
    Json(ResultsListResponse {
        success: true,
        available_results,
        total_count,
    })
}

/// GET /results/{timestamp} - persisted results as JSON. Consumed by
/// programs rather than people following stale links, so unlike the HTML
/// route this reports 404 instead of degrading to an empty page.
pub async fn saved_results_json(
    State(state): State<AppState>,
    Path(timestamp): Path<String>,
) -> Result<Json<SavedResultsResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.store.load(&timestamp) {
        Ok(results) => {
            let total_results = results.len();
            Ok(Json(SavedResultsResponse {
                success: true,
                results,
                total_results,
                timestamp,
            }))
        }
        Err(e) => {
            tracing::warn!("Could not load results for '{timestamp}': {e}");
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new(format!(
                    "No saved results for timestamp {timestamp}"
                ))),
            ))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestBackendResponse {
    pub success: bool,
    pub message: String,
}

/// GET /test-backend - connectivity probe against the backend's health
/// endpoint. Always HTTP 200; `success` carries the verdict.
pub async fn test_backend(State(state): State<AppState>) -> Json<TestBackendResponse> {
    match state.backend.health().await {
        Ok(()) => Json(TestBackendResponse {
            success: true,
            message: "Backend is reachable".to_string(),
        }),
        Err(e) => Json(TestBackendResponse {
            success: false,
            message: format!("Backend is not reachable: {e}"),
        }),
    }
}
