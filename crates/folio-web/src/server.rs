use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use folio_core::{ChartRenderer, PortfolioAnalyzer};

use crate::config::Config;
use crate::handlers;

/// Outer bound on one request; the pipeline itself carries no timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared application state. The analyzer holds no mutable state, so one
/// instance serves all concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<PortfolioAnalyzer>,
    pub charts: Arc<dyn ChartRenderer>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/analyze_portfolio", get(handlers::analyze_portfolio))
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: &Config, state: AppState) -> Result<(), std::io::Error> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await
}
