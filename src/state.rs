use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::store::ResultStore;

/// Shared application state. Cheap to clone; one copy per request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    pub store: Arc<ResultStore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // Ensure the results root exists
        std::fs::create_dir_all(&config.results_dir)?;

        let backend = BackendClient::new(config.backend.clone())?;
        let store = Arc::new(ResultStore::new(&config.results_dir));

        Ok(Self {
            config,
            backend,
            store,
        })
    }
}
