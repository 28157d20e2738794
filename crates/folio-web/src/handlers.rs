use axum::extract::{Query, State};
use axum::response::{Html, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use folio_core::ChartSeries;

use crate::error::ApiError;
use crate::html;
use crate::server::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Portfolio Analysis API! Use /analyze_portfolio to analyze stock tickers."
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    /// Comma-separated ticker symbols, e.g. AAPL,GOOGL,MSFT.
    pub tickers: String,
}

pub async fn analyze_portfolio(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Html<String>, ApiError> {
    let report = state.analyzer.analyze(params.tickers.split(',')).await?;

    let cumulative_chart = state.charts.render_line(
        ChartSeries {
            dates: &report.daily_returns.dates,
            values: &report.cumulative_returns,
        },
        "Cumulative Portfolio Returns",
        "Cumulative Returns",
    );
    let daily_chart = state.charts.render_line(
        ChartSeries {
            dates: &report.daily_returns.dates,
            values: &report.daily_returns.values,
        },
        "Daily Portfolio Returns",
        "Daily Returns",
    );

    Ok(Html(html::analysis_page(
        &report.analysis,
        &cumulative_chart,
        &daily_chart,
    )))
}
