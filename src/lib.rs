//! # course-search
//!
//! A thin web frontend for natural-language course search. It accepts a
//! free-text query from the browser, forwards it to an external search
//! backend over HTTP, persists the returned result set to disk under a
//! timestamp-named directory, and serves shareable result pages keyed by
//! that timestamp.
//!
//! ## Request flow
//!
//! ```text
//!   browser ── POST /query ──▶ ┌──────────────────┐
//!                              │ Query Orchestrator│
//!                              │  (api::query)     │
//!                              └───────┬───────────┘
//!                                      │ one call, no retries
//!                                      ▼
//!                              ┌──────────────────┐   GET /health (5 s)
//!                              │  Backend Client   │──▶ POST /query (300 s)
//!                              │  (backend)        │◀── {results:[...]} | [...]
//!                              └───────┬───────────┘
//!                                      │ persist (non-fatal on failure)
//!                                      ▼
//!                              ┌──────────────────┐
//!                              │   Result Store    │  results/<timestamp>/
//!                              │   (store)         │    results.json
//!                              └───────┬───────────┘
//!                                      │
//!                                      ▼
//!          {success, results, total_results, timestamp}
//!
//!   browser ── GET /{timestamp} ──▶ Page Server (api::pages)
//!                                   └─ store.load ─▶ page, or the empty
//!                                      page when absent/corrupt
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, results dir, and backend settings
//! - [`models`] - Shared data types: lenient `Course`, backend payload shapes, request/response types
//! - [`backend`] - Backend Client: health probe, search call, failure classification
//! - [`store`] - Result Store: timestamp-keyed, write-once, collision-safe persistence
//! - [`api`] - Axum HTTP handlers for query orchestration and page serving
//! - [`state`] - Shared application state holding the client, store, and config

pub mod api;
pub mod backend;
pub mod config;
pub mod models;
pub mod state;
pub mod store;
