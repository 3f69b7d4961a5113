use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::backend::BackendError;
use crate::models::{ErrorBody, QueryRequest, QueryResponse};
use crate::state::AppState;

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

/// POST /query - one query lifecycle:
///   1. Validate the query is non-empty (rejected before any network call)
///   2. One backend search call (health probe + query, no retries)
///   3. Persist the result set under a fresh timestamp
///   4. Respond with results and the shareable timestamp
pub async fn submit_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ErrorResponse> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Query cannot be empty")),
        ));
    }

    tracing::info!("Forwarding query to backend: {query}");

    let results = state
        .backend
        .search(&query, req.timestamp.as_deref())
        .await
        .map_err(error_response)?;

    // A successful search that fails to persist is still returned to the
    // caller; only the shareable link is lost.
    let timestamp = match state.store.save(&query, &results) {
        Ok(ts) => {
            tracing::info!("Saved {} results under {ts}", results.len());
            Some(ts.into_inner())
        }
        Err(e) => {
            tracing::warn!("Failed to persist results for query '{query}': {e}");
            None
        }
    };

    let total_results = results.len();
    Ok(Json(QueryResponse {
        success: true,
        results,
        total_results,
        timestamp,
    }))
}

fn error_response(err: BackendError) -> ErrorResponse {
    let status = match &err {
        BackendError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        BackendError::Upstream { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        BackendError::Invalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match &err {
        // The user-facing message for these is generic; keep the cause in the logs.
        BackendError::Invalid(source) => tracing::error!("Backend call failed: {source}"),
        _ => tracing::warn!("Backend call failed: {err}"),
    }

    (status, Json(ErrorBody::new(err.to_string())))
}
