use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One course record returned by the search backend.
///
/// The backend aggregates several providers and its output is loosely typed:
/// any field may be missing, strings sometimes arrive as numbers, and list
/// fields sometimes arrive as a single scalar. Decoding is therefore lenient
/// per field, and fields this frontend does not know about are carried
/// through untouched in `extra` so persisted documents lose nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub instructors: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub learning_outcomes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub viewers: Option<u64>,
    /// Provider-specific fields passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn value_to_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept a string where the backend may send a number or bool instead.
/// Arrays and objects in a scalar position decode to `None` rather than
/// failing the whole document.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(v.and_then(value_to_string))
}

/// Accept either a single scalar or an array of scalars for list fields
/// (instructors, skills, ...). Non-scalar array entries are dropped.
fn string_or_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_string).collect(),
        Some(other) => value_to_string(other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// Viewer counts arrive as integers, floats, or formatted strings ("1,234").
fn lenient_count<'de, D>(de: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    })
}

/// The backend's response shape has changed across versions: older builds
/// return a bare array of courses, newer ones wrap it in `{results: [...]}`
/// (sometimes with a `success` field already present). Both are accepted;
/// the richer shape is tried first.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResultsPayload {
    Wrapped { results: Vec<Course> },
    Bare(Vec<Course>),
}

impl ResultsPayload {
    pub fn into_results(self) -> Vec<Course> {
        match self {
            ResultsPayload::Wrapped { results } => results,
            ResultsPayload::Bare(results) => results,
        }
    }
}

/// Query request from the browser
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Timestamp of a previous result set, for follow-up queries
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Query response to the browser
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub results: Vec<Course>,
    pub total_results: usize,
    /// Absent when the result set could not be persisted (the results are
    /// still usable, only the shareable link is lost).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Error response body, `{success: false, error: "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// GET /results response
#[derive(Debug, Clone, Serialize)]
pub struct ResultsListResponse {
    pub success: bool,
    /// Newest first
    pub available_results: Vec<String>,
    pub total_count: usize,
}

/// GET /results/{timestamp} response
#[derive(Debug, Clone, Serialize)]
pub struct SavedResultsResponse {
    pub success: bool,
    pub results: Vec<Course>,
    pub total_results: usize,
    pub timestamp: String,
}
