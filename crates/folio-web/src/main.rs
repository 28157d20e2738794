mod config;
mod error;
mod handlers;
mod html;
mod server;

use std::sync::Arc;

use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

use folio_core::{
    HttpClient, OpenAiChatClient, PortfolioAnalyzer, ReqwestHttpClient, SvgChartRenderer,
    YahooAdapter,
};

use crate::config::{Config, ConfigError};
use crate::server::AppState;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_web=info,folio_core=info".into()),
        )
        .init();

    if let Err(err) = run().await {
        error!("startup failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let market_data = Arc::new(YahooAdapter::with_http_client(transport.clone()));
    let completion = Arc::new(OpenAiChatClient::new(
        transport,
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    ));

    let state = AppState {
        analyzer: Arc::new(PortfolioAnalyzer::new(market_data, completion)),
        charts: Arc::new(SvgChartRenderer),
    };

    server::serve(&config, state).await?;
    Ok(())
}
