//! Core contracts and pipeline for folio.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The portfolio-return pipeline (normalize, fetch, align, aggregate)
//! - Collaborator contracts and adapters (market data, text completion,
//!   chart rendering) with substitutable in-memory implementations
//! - Structured pipeline errors
//!
//! The HTTP surface lives in `folio-web`; nothing in this crate binds a
//! socket or reads the environment.

pub mod adapters;
pub mod analysis;
pub mod chart;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod market_data;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use adapters::YahooAdapter;
pub use analysis::{
    build_prompt, CompletionError, CompletionRequest, OpenAiChatClient, TextCompletionService,
};
pub use chart::{ChartRenderer, ChartSeries, RenderedChart, SvgChartRenderer};
pub use domain::{
    DateRange, PortfolioReturns, PricePoint, PriceSeries, Symbol, HISTORY_WINDOW,
};
pub use error::{PipelineError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use market_data::{
    HistoryBatch, HistoryRequest, MarketDataSource, SourceError, SourceErrorKind, SymbolHistory,
};
pub use pipeline::{normalize_tickers, AlignedReturns, PortfolioAnalyzer};
pub use report::{cumulative_returns, PortfolioReport};
pub use stats::SummaryStatistics;
