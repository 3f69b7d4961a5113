use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use course_search::api;
use course_search::config::Config;
use course_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Results directory: {}", config.results_dir.display());
    tracing::info!("Search backend: {}", config.backend.base_url);

    let state = AppState::new(config.clone())?;

    let app = Router::new()
        .route("/", get(api::pages::landing))
        .route("/query", post(api::query::submit_query))
        .route("/results", get(api::pages::list_saved))
        .route("/results/{timestamp}", get(api::pages::saved_results_json))
        .route("/test-backend", get(api::pages::test_backend))
        // Shareable result pages; static routes above take precedence
        .route("/{timestamp}", get(api::pages::saved_results_page))
        .with_state(state)
        .fallback(get(api::pages::landing));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
