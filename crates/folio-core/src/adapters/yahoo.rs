use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime};
use tracing::debug;

use crate::domain::{DateRange, PricePoint, PriceSeries, Symbol};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::market_data::{HistoryBatch, HistoryRequest, MarketDataSource, SourceError};

const SPARK_ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/spark";

/// Yahoo Finance adapter fetching daily closes for a whole symbol batch in
/// a single spark request.
///
/// With a mock transport the adapter produces deterministic seeded series
/// instead of going upstream, so offline runs and tests stay reproducible.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
        }
    }
}

// Real API implementation.
impl YahooAdapter {
    async fn fetch_real_closes(&self, req: &HistoryRequest) -> Result<HistoryBatch, SourceError> {
        let symbols_param = req
            .symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let endpoint = format!(
            "{SPARK_ENDPOINT}?symbols={}&interval=1d&period1={}&period2={}",
            urlencoding::encode(&symbols_param),
            unix_timestamp(req.range.start),
            unix_timestamp(req.range.end),
        );

        debug!(symbols = %symbols_param, "requesting daily closes from yahoo");

        let request = HttpRequest::get(&endpoint).with_timeout_ms(30_000);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("yahoo transport error: {}", e.message())))?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        let envelope: SparkEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::internal(format!("failed to parse yahoo response: {e}")))?;

        if let Some(error) = envelope.spark.error {
            return Err(SourceError::unavailable(format!(
                "yahoo reported an error: {error}"
            )));
        }

        let results = envelope.spark.result.unwrap_or_default();
        let mut series = Vec::with_capacity(results.len());
        for result in results {
            let symbol = match Symbol::parse(&result.symbol) {
                Ok(symbol) => symbol,
                Err(_) => continue,
            };
            series.push(normalize_spark_result(symbol, result, req.range)?);
        }

        Ok(HistoryBatch { series })
    }
}

// Deterministic mock data, used whenever the transport is a mock.
impl YahooAdapter {
    fn mock_closes(&self, req: &HistoryRequest) -> HistoryBatch {
        let series = req
            .symbols
            .iter()
            .map(|symbol| mock_series(symbol, req.range))
            .collect();
        HistoryBatch { series }
    }
}

impl MarketDataSource for YahooAdapter {
    fn daily_closes<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_closes(&req).await
            } else {
                Ok(self.mock_closes(&req))
            }
        })
    }
}

fn unix_timestamp(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn normalize_spark_result(
    symbol: Symbol,
    result: SparkResult,
    range: DateRange,
) -> Result<PriceSeries, SourceError> {
    let Some(response) = result.response.into_iter().next() else {
        return Ok(PriceSeries::empty(symbol));
    };

    let closes = response
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    // Null closes are dropped here, so a column the provider acknowledged
    // but never populated comes out as an empty series.
    let mut by_date = BTreeMap::new();
    for (ts, close) in response.timestamp.into_iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite()) else {
            continue;
        };
        let date = OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| SourceError::internal(format!("invalid timestamp in yahoo response: {e}")))?
            .date();
        if range.contains(date) {
            by_date.insert(date, close);
        }
    }

    let points = by_date
        .into_iter()
        .map(|(date, close)| PricePoint { date, close })
        .collect();

    PriceSeries::new(symbol, points).map_err(|e| SourceError::internal(e.to_string()))
}

fn mock_series(symbol: &Symbol, range: DateRange) -> PriceSeries {
    const MOCK_DAYS: usize = 40;

    let seed = symbol_seed(symbol);
    let mut points = Vec::with_capacity(MOCK_DAYS);
    let mut date = range.start;
    for index in 0..MOCK_DAYS {
        if date > range.end {
            break;
        }
        let base = 60.0 + (seed % 400) as f64 / 10.0;
        let wiggle = ((seed.wrapping_add(index as u64 * 7)) % 90) as f64 / 100.0;
        points.push(PricePoint {
            date,
            close: base + wiggle,
        });
        date += Duration::days(1);
    }

    PriceSeries::new(symbol.clone(), points).expect("mock dates ascend by construction")
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(7_u64, |acc, byte| {
        acc.wrapping_mul(31).wrapping_add(byte as u64)
    })
}

// Yahoo spark wire format.
#[derive(Debug, Deserialize)]
struct SparkEnvelope {
    spark: SparkPayload,
}

#[derive(Debug, Deserialize)]
struct SparkPayload {
    #[serde(default)]
    result: Option<Vec<SparkResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SparkResult {
    symbol: String,
    #[serde(default)]
    response: Vec<SparkResponse>,
}

#[derive(Debug, Deserialize)]
struct SparkResponse {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: SparkIndicators,
}

#[derive(Debug, Deserialize)]
struct SparkIndicators {
    #[serde(default)]
    quote: Vec<SparkQuote>,
}

#[derive(Debug, Deserialize)]
struct SparkQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HISTORY_WINDOW;
    use crate::http_client::{HttpError, HttpResponse};
    use std::sync::Mutex;

    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn with_body(body: &str) -> Self {
            Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn request_for(tickers: &[&str]) -> HistoryRequest {
        let symbols = tickers
            .iter()
            .map(|t| Symbol::parse(t).expect("valid symbol"))
            .collect();
        HistoryRequest::new(symbols, HISTORY_WINDOW).expect("valid request")
    }

    const TWO_SYMBOL_BODY: &str = r#"{
        "spark": {
            "result": [
                {
                    "symbol": "AAPL",
                    "response": [{
                        "timestamp": [1704153600, 1704240000, 1704326400],
                        "indicators": {"quote": [{"close": [100.0, null, 110.0]}]}
                    }]
                },
                {
                    "symbol": "MSFT",
                    "response": [{
                        "timestamp": [1704153600, 1704240000],
                        "indicators": {"quote": [{"close": [null, null]}]}
                    }]
                }
            ],
            "error": null
        }
    }"#;

    #[tokio::test]
    async fn batch_is_fetched_with_a_single_upstream_call() {
        let client = Arc::new(RecordingHttpClient::with_body(TWO_SYMBOL_BODY));
        let adapter = YahooAdapter::with_http_client(client.clone());

        adapter
            .daily_closes(request_for(&["AAPL", "MSFT"]))
            .await
            .expect("fetch should succeed");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("AAPL%2CMSFT"));
    }

    #[tokio::test]
    async fn null_closes_are_dropped_leaving_an_empty_series() {
        let client = Arc::new(RecordingHttpClient::with_body(TWO_SYMBOL_BODY));
        let adapter = YahooAdapter::with_http_client(client);

        let batch = adapter
            .daily_closes(request_for(&["AAPL", "MSFT"]))
            .await
            .expect("fetch should succeed");

        let aapl = Symbol::parse("AAPL").expect("valid");
        let msft = Symbol::parse("MSFT").expect("valid");

        let aapl_series = batch.series_for(&aapl).expect("aapl acknowledged");
        assert_eq!(aapl_series.len(), 2);
        assert_eq!(aapl_series.points[0].close, 100.0);
        assert_eq!(aapl_series.points[1].close, 110.0);

        let msft_series = batch.series_for(&msft).expect("msft acknowledged");
        assert!(msft_series.is_empty());
    }

    #[tokio::test]
    async fn upstream_http_failure_maps_to_unavailable() {
        let client = Arc::new(RecordingHttpClient {
            response: Ok(HttpResponse {
                status: 503,
                body: String::new(),
            }),
            requests: Mutex::new(Vec::new()),
        });
        let adapter = YahooAdapter::with_http_client(client);

        let error = adapter
            .daily_closes(request_for(&["AAPL"]))
            .await
            .expect_err("must fail");
        assert!(error.message().contains("503"));
    }

    #[tokio::test]
    async fn mock_mode_returns_every_requested_symbol() {
        let adapter = YahooAdapter::default();

        let batch = adapter
            .daily_closes(request_for(&["AAPL", "MSFT", "NVDA"]))
            .await
            .expect("mock fetch should succeed");

        assert_eq!(batch.series.len(), 3);
        for series in &batch.series {
            assert!(series.len() >= 2, "mock series must support returns");
        }
    }
}
