//! The portfolio-return pipeline.
//!
//! One synchronous pass per request: normalize tickers, fetch the batch of
//! daily closes, align the per-symbol series onto a shared date index,
//! compute adjacent-period returns, aggregate them into an equal-weighted
//! portfolio series, then obtain the language-model analysis. Every failure
//! is terminal; nothing here retries or returns partial results.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use time::Date;
use tracing::{debug, info, warn};

use crate::analysis::{build_prompt, CompletionRequest, TextCompletionService};
use crate::domain::{PortfolioReturns, PriceSeries, Symbol, HISTORY_WINDOW};
use crate::error::PipelineError;
use crate::market_data::{HistoryBatch, HistoryRequest, MarketDataSource};
use crate::report::PortfolioReport;
use crate::stats::SummaryStatistics;

/// Trim, upper-case, and drop empty entries; order and duplicates are
/// preserved.
pub fn normalize_tickers<'a>(
    raw: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Symbol>, PipelineError> {
    let symbols: Vec<Symbol> = raw
        .into_iter()
        .filter_map(|entry| Symbol::parse(entry).ok())
        .collect();

    if symbols.is_empty() {
        return Err(PipelineError::InvalidInput);
    }

    Ok(symbols)
}

/// Per-symbol return columns re-indexed onto one shared date index.
///
/// Rows are gap-free: a date appears only when every surviving symbol has a
/// return for it. Each row holds one return per symbol, in symbol order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    pub symbols: Vec<Symbol>,
    pub dates: Vec<Date>,
    pub rows: Vec<Vec<f64>>,
}

/// Pull the usable close columns out of a provider batch.
///
/// Two very different unhappy paths meet here and must stay separate: a
/// symbol the provider never acknowledged fails the whole request (the
/// caller asked for it by name, so a typo must not vanish silently), while
/// an acknowledged symbol whose column cannot produce a single return is
/// dropped and the rest of the portfolio proceeds without it.
pub fn extract_columns(
    batch: &HistoryBatch,
    requested: &[Symbol],
) -> Result<Vec<PriceSeries>, PipelineError> {
    let mut columns = Vec::with_capacity(requested.len());
    for symbol in requested {
        let series = batch
            .series_for(symbol)
            .ok_or_else(|| PipelineError::SymbolNotFound {
                symbol: symbol.clone(),
            })?;
        columns.push(series.clone());
    }

    let mut survivors = Vec::with_capacity(columns.len());
    for column in columns {
        if column.len() < 2 {
            warn!(symbol = %column.symbol, points = column.len(), "dropping unusable price column");
            continue;
        }
        survivors.push(column);
    }

    if survivors.is_empty() {
        return Err(PipelineError::NoValidData);
    }

    Ok(survivors)
}

/// Align the columns onto the union date index and compute
/// adjacent-period returns, keeping only fully-populated rows.
pub fn compute_returns(columns: &[PriceSeries]) -> Result<AlignedReturns, PipelineError> {
    let index: Vec<Date> = columns
        .iter()
        .flat_map(|column| column.points.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let per_symbol_returns: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|column| column_returns(column, &index))
        .collect();

    let symbols: Vec<Symbol> = columns.iter().map(|c| c.symbol.clone()).collect();
    let mut dates = Vec::new();
    let mut rows = Vec::new();

    // Position 0 never has a return; a later position survives only when
    // every symbol produced one there.
    for position in 1..index.len() {
        let row: Option<Vec<f64>> = per_symbol_returns
            .iter()
            .map(|returns| returns[position])
            .collect();
        if let Some(row) = row {
            dates.push(index[position]);
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(PipelineError::EmptyReturns);
    }

    Ok(AlignedReturns {
        symbols,
        dates,
        rows,
    })
}

fn column_returns(column: &PriceSeries, index: &[Date]) -> Vec<Option<f64>> {
    let closes: BTreeMap<Date, f64> = column
        .points
        .iter()
        .map(|point| (point.date, point.close))
        .collect();

    let mut returns = Vec::with_capacity(index.len());
    returns.push(None);
    for pair in index.windows(2) {
        let value = match (closes.get(&pair[0]), closes.get(&pair[1])) {
            (Some(previous), Some(current)) => Some((current - previous) / previous),
            _ => None,
        };
        returns.push(value);
    }
    returns
}

/// Collapse the aligned return table into one equal-weighted series.
///
/// The emptiness re-check duplicates the one in [`compute_returns`] on
/// purpose: the dot product can reintroduce gaps (non-finite values), and
/// the two conditions are validated independently.
pub fn aggregate(aligned: &AlignedReturns) -> Result<PortfolioReturns, PipelineError> {
    let n = aligned.symbols.len();
    let weight = 1.0 / n as f64;
    let weights = vec![weight; n];

    let mut dates = Vec::with_capacity(aligned.dates.len());
    let mut values = Vec::with_capacity(aligned.dates.len());
    for (date, row) in aligned.dates.iter().zip(&aligned.rows) {
        let portfolio_return: f64 = row.iter().zip(&weights).map(|(r, w)| r * w).sum();
        if !portfolio_return.is_finite() {
            continue;
        }
        dates.push(*date);
        values.push(portfolio_return);
    }

    debug_assert!(
        dates.windows(2).all(|pair| pair[0] < pair[1]),
        "portfolio date index must stay ascending"
    );

    if values.is_empty() {
        return Err(PipelineError::EmptyReturns);
    }

    Ok(PortfolioReturns { dates, values })
}

/// Per-request pipeline over injected collaborators. Holds no mutable
/// state; one instance serves every request.
pub struct PortfolioAnalyzer {
    market_data: Arc<dyn MarketDataSource>,
    completion: Arc<dyn TextCompletionService>,
}

impl PortfolioAnalyzer {
    pub fn new(
        market_data: Arc<dyn MarketDataSource>,
        completion: Arc<dyn TextCompletionService>,
    ) -> Self {
        Self {
            market_data,
            completion,
        }
    }

    /// Run the full pipeline for a raw ticker list.
    pub async fn analyze<'a>(
        &self,
        raw_tickers: impl IntoIterator<Item = &'a str>,
    ) -> Result<PortfolioReport, PipelineError> {
        let symbols = normalize_tickers(raw_tickers)?;
        info!(tickers = ?symbols.iter().map(Symbol::as_str).collect::<Vec<_>>(), "analyzing portfolio");

        let request = HistoryRequest::new(symbols.clone(), HISTORY_WINDOW)
            .map_err(|e| PipelineError::DataRetrieval(e.to_string()))?;
        let batch = self
            .market_data
            .daily_closes(request)
            .await
            .map_err(|e| PipelineError::DataRetrieval(e.to_string()))?;
        if batch.series.is_empty() {
            return Err(PipelineError::DataRetrieval(
                "provider response contained no symbols".to_owned(),
            ));
        }
        debug!(symbols = batch.series.len(), "price history downloaded");

        let columns = extract_columns(&batch, &symbols)?;
        let aligned = compute_returns(&columns)?;
        let daily = aggregate(&aligned)?;
        debug!(rows = daily.len(), "portfolio returns computed");

        let statistics = SummaryStatistics::from_returns(&daily);
        let prompt = build_prompt(&statistics);
        let analysis = self
            .completion
            .complete(CompletionRequest::analysis(prompt))
            .await
            .map_err(|e| PipelineError::AnalysisService(e.to_string()))?;

        Ok(PortfolioReport::assemble(analysis, daily, statistics))
    }
}
