use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::models::{Course, ResultsPayload};

/// Failure classes for a backend call. Display strings are what the browser
/// sees, so they stay user-presentable; internals go to the logs.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend service is unavailable. Please make sure the backend search service is running.")]
    Unavailable,
    #[error("Request timeout. The query is taking too long to process.")]
    Timeout,
    /// Non-success status from the backend; `message` is the backend's own
    /// `error` field when it sent one.
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("Failed to process query")]
    Invalid(#[source] reqwest::Error),
}

/// HTTP client for the external search backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    config: BackendConfig,
}

#[derive(Serialize)]
struct BackendQueryRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Liveness probe against GET /health with a short timeout.
    pub async fn health(&self) -> Result<(), BackendError> {
        let url = format!("{}/health", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.health_timeout_secs))
            .send()
            .await
            .map_err(|_| BackendError::Unavailable)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Unavailable)
        }
    }

    /// Issue one search call to the backend. No retries: search queries can
    /// be expensive, and a silent retry could duplicate that cost.
    pub async fn search(
        &self,
        query: &str,
        context: Option<&str>,
    ) -> Result<Vec<Course>, BackendError> {
        // Probe liveness first so a dead backend fails fast instead of
        // eating the full query timeout.
        self.health().await?;

        let url = format!("{}/query", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&BackendQueryRequest {
                query,
                timestamp: context,
            })
            .timeout(Duration::from_secs(self.config.query_timeout_secs))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let payload: ResultsPayload = resp.json().await.map_err(BackendError::Invalid)?;
        Ok(payload.into_results())
    }
}

fn classify_transport(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else if e.is_connect() {
        BackendError::Unavailable
    } else {
        BackendError::Invalid(e)
    }
}

/// Pull the backend's `error` field out of a non-success body, falling back
/// to a generic message when the body is not the expected JSON.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| "Backend returned an error".to_string())
}
