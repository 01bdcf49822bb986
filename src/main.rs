//! News Sentiment Dashboard: binary entrypoint
//! Boots the Axum HTTP server with shared state, metrics and CORS.

use std::sync::Arc;

use news_sentiment_dashboard::api::{create_router, AppState};
use news_sentiment_dashboard::config::DashboardConfig;
use news_sentiment_dashboard::engine::HttpProviderFactory;
use news_sentiment_dashboard::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - DASHBOARD_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("DASHBOARD_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("engine=info,ingest=info,api=info,warn"));

    // Shuttle may already have a subscriber installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = Arc::new(DashboardConfig::load_default()?);
    let providers = Arc::new(HttpProviderFactory::new(config.clone())?);
    let metrics = Metrics::init()?;

    tracing::info!(
        target: "api",
        news_key = config.news_api_key.is_some(),
        youtube_key = config.youtube_api_key.is_some(),
        "dashboard configured"
    );

    let state = AppState::new(config, providers);
    let router = create_router(state).merge(metrics.router());

    Ok(router.into())
}
