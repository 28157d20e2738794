use thiserror::Error;

use crate::domain::Symbol;

/// Validation errors raised while parsing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("price series for '{symbol}' is not date-ascending")]
    UnorderedSeries { symbol: String },
}

/// Terminal pipeline failures, one variant per failure class.
///
/// Every variant aborts the request; the web layer maps each to a distinct
/// HTTP status. No variant is ever retried or recovered locally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The normalized ticker list came out empty.
    #[error("no usable ticker symbols provided")]
    InvalidInput,

    /// The market data collaborator failed, or returned nothing at all.
    #[error("market data retrieval failed: {0}")]
    DataRetrieval(String),

    /// A requested symbol has no representation in the provider response.
    #[error("no data found for ticker: {symbol}")]
    SymbolNotFound { symbol: Symbol },

    /// Every requested symbol was present but carried no usable history.
    #[error("none of the requested tickers have usable price history")]
    NoValidData,

    /// Alignment or aggregation produced an empty return series.
    #[error("portfolio returns could not be computed")]
    EmptyReturns,

    /// The language-model collaborator failed.
    #[error("analysis service error: {0}")]
    AnalysisService(String),
}
