use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Course, ResultsPayload};

/// Name of the results document inside each timestamp directory.
const RESULTS_FILE: &str = "results.json";

/// Time-derived identifier of a persisted result set, also used as a URL
/// path segment (e.g. `20250101T120000Z`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no saved results for timestamp {0}")]
    NotFound(String),
    #[error("saved results for timestamp {0} are corrupt")]
    Corrupt(String, #[source] serde_json::Error),
    #[error("failed to encode results document")]
    Encode(#[from] serde_json::Error),
    #[error("failed to persist results: {0}")]
    Io(#[from] std::io::Error),
}

/// Document written to `<root>/<timestamp>/results.json`. Readers accept
/// this shape or a bare course array (see [`ResultsPayload`]).
#[derive(Serialize)]
struct SavedDocument<'a> {
    query: &'a str,
    saved_at: String,
    results: &'a [Course],
}

/// Filesystem-backed persistence of query results: one directory per
/// timestamp, one document per directory. Records are written once and
/// never updated; retention is an external concern.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a result set under a freshly minted timestamp and return it.
    pub fn save(&self, query: &str, results: &[Course]) -> Result<Timestamp, StoreError> {
        let base = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        self.save_with_base(&base, query, results)
    }

    /// Two queries served within the same clock second mint the same base
    /// timestamp; the loser of the `create_dir` race gets a `-2`, `-3`, ...
    /// suffix so neither record is overwritten.
    fn save_with_base(
        &self,
        base: &str,
        query: &str,
        results: &[Course],
    ) -> Result<Timestamp, StoreError> {
        fs::create_dir_all(&self.root)?;

        let mut candidate = base.to_string();
        let mut n = 2u32;
        let dir = loop {
            let dir = self.root.join(&candidate);
            match fs::create_dir(&dir) {
                Ok(()) => break dir,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = format!("{base}-{n}");
                    n += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let doc = SavedDocument {
            query,
            saved_at: Utc::now().to_rfc3339(),
            results,
        };
        let data = serde_json::to_string_pretty(&doc)?;

        // Atomic write via temp file + rename so readers never observe a
        // partially written document.
        let tmp_path = dir.join("results.json.tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, dir.join(RESULTS_FILE))?;

        Ok(Timestamp(candidate))
    }

    /// Load the result set persisted under `timestamp`. Fails only with
    /// `NotFound` (no such record, or a timestamp that is not a valid path
    /// segment) or `Corrupt` (document exists but cannot be parsed).
    pub fn load(&self, timestamp: &str) -> Result<Vec<Course>, StoreError> {
        if !is_safe_segment(timestamp) {
            return Err(StoreError::NotFound(timestamp.to_string()));
        }

        let path = self.root.join(timestamp).join(RESULTS_FILE);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(timestamp.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let payload: ResultsPayload = serde_json::from_str(&data)
            .map_err(|e| StoreError::Corrupt(timestamp.to_string(), e))?;
        Ok(payload.into_results())
    }

    /// List persisted timestamps, newest first. A missing or unreadable
    /// results root is an empty list, not an error.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut timestamps: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        timestamps.sort_by(|a, b| b.cmp(a));
        timestamps
    }
}

/// Reject identifiers that could escape the results root when used as a
/// path segment.
fn is_safe_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/') && !s.contains('\\') && !s.contains("..")
}
