//! Shared in-memory fakes for the behavioral test suites.
//!
//! Each fake substitutes one external collaborator so pipeline semantics
//! can be exercised without any network dependency.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use time::Date;

use folio_core::{
    CompletionError, CompletionRequest, HistoryBatch, HistoryRequest, MarketDataSource,
    PricePoint, PriceSeries, SourceError, Symbol, TextCompletionService,
};

/// Build a provider batch from literal per-symbol close tables.
pub fn batch_of(columns: &[(&str, &[(Date, f64)])]) -> HistoryBatch {
    let series = columns
        .iter()
        .map(|(ticker, closes)| {
            let symbol = Symbol::parse(ticker).expect("valid test ticker");
            let points = closes
                .iter()
                .map(|(date, close)| PricePoint {
                    date: *date,
                    close: *close,
                })
                .collect();
            PriceSeries::new(symbol, points).expect("test closes are date-ascending")
        })
        .collect();
    HistoryBatch { series }
}

/// Market data fake answering every call with one scripted result and
/// counting how many calls were made.
pub struct ScriptedMarketData {
    result: Result<HistoryBatch, SourceError>,
    calls: AtomicUsize,
}

impl ScriptedMarketData {
    pub fn returning(batch: HistoryBatch) -> Self {
        Self {
            result: Ok(batch),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataSource for ScriptedMarketData {
    fn daily_closes<'a>(
        &'a self,
        _req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

/// Completion fake returning a canned analysis and recording every request.
pub struct CannedCompletion {
    analysis: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedCompletion {
    pub fn answering(analysis: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl TextCompletionService for CannedCompletion {
    fn complete<'a>(
        &'a self,
        req: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(req);
        let analysis = self.analysis.clone();
        Box::pin(async move { Ok(analysis) })
    }
}

/// Completion fake that always fails.
pub struct FailingCompletion;

impl TextCompletionService for FailingCompletion {
    fn complete<'a>(
        &'a self,
        _req: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        Box::pin(async move { Err(CompletionError::new("completion endpoint unreachable")) })
    }
}
