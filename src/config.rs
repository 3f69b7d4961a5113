use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where persisted query results are stored (one directory per timestamp)
    pub results_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Search backend configuration
    pub backend: BackendConfig,
}

/// Configuration for the external search backend this frontend delegates to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL for the backend API (e.g. "http://localhost:5000")
    pub base_url: String,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Timeout for the /health liveness probe in seconds
    pub health_timeout_secs: u64,
    /// Timeout for /query in seconds. Natural-language search can take
    /// minutes, so this is deliberately long.
    pub query_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("./results"),
            bind_addr: "127.0.0.1:3000".to_string(),
            backend: BackendConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout_secs: 10,
            health_timeout_secs: 5,
            query_timeout_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("COURSE_SEARCH_RESULTS_DIR") {
            config.results_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("COURSE_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("BACKEND_URL") {
            config.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(val) = std::env::var("BACKEND_CONNECT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.backend.connect_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("BACKEND_HEALTH_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.backend.health_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("BACKEND_QUERY_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.backend.query_timeout_secs = v;
            }
        }

        config
    }
}
