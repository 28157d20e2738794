//! Market data source contract.
//!
//! The pipeline issues exactly one batch call per request: all requested
//! symbols travel together so the provider round trip count stays at one.
//! A provider may answer with partial data: a symbol can be missing from
//! the batch entirely, or present with an empty series. The pipeline treats
//! those two shapes very differently (hard failure vs. silent drop), so
//! adapters must preserve the distinction instead of papering over it.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::domain::{DateRange, PriceSeries, Symbol};

/// Batch request for daily closing prices.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub symbols: Vec<Symbol>,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(symbols: Vec<Symbol>, range: DateRange) -> Result<Self, SourceError> {
        if symbols.is_empty() {
            return Err(SourceError::invalid_request(
                "history request must include at least one symbol",
            ));
        }
        Ok(Self { symbols, range })
    }
}

/// Per-symbol slice of a provider response. The series may be empty.
pub type SymbolHistory = PriceSeries;

/// Provider response: one entry per symbol the provider acknowledged.
/// Symbols the provider does not know are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBatch {
    pub series: Vec<SymbolHistory>,
}

impl HistoryBatch {
    /// Look up the acknowledged series for a symbol, if any.
    pub fn series_for(&self, symbol: &Symbol) -> Option<&SymbolHistory> {
        self.series.iter().find(|entry| &entry.symbol == symbol)
    }
}

/// Source failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    InvalidRequest,
    Internal,
}

/// Structured market-data source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

/// Market data source contract.
///
/// One call covers the whole requested batch; there is no per-symbol
/// retry or fallback. A failed call is terminal for the request.
pub trait MarketDataSource: Send + Sync {
    /// Fetch daily closing prices for every requested symbol over the
    /// given window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider call itself fails; partial
    /// per-symbol data is not an error at this layer.
    fn daily_closes<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HISTORY_WINDOW;

    #[test]
    fn rejects_empty_symbol_batch() {
        let err = HistoryRequest::new(vec![], HISTORY_WINDOW).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert!(err.message().contains("symbol"));
    }

    #[test]
    fn batch_lookup_distinguishes_absent_from_empty() {
        let known = Symbol::parse("AAPL").expect("valid");
        let unknown = Symbol::parse("ZZZT").expect("valid");
        let batch = HistoryBatch {
            series: vec![SymbolHistory::empty(known.clone())],
        };

        assert!(batch.series_for(&known).is_some_and(PriceSeries::is_empty));
        assert!(batch.series_for(&unknown).is_none());
    }
}
