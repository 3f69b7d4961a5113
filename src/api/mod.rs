//! Axum HTTP handlers: query orchestration and page/result serving.

pub mod pages;
pub mod query;
