use time::macros::date;
use time::Date;

use crate::{Symbol, ValidationError};

/// Inclusive historical window queried from the market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

/// Fixed query window; not user-supplied.
pub const HISTORY_WINDOW: DateRange = DateRange {
    start: date!(2016 - 01 - 01),
    end: date!(2024 - 05 - 01),
};

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One daily closing price observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
}

/// Per-symbol daily closing prices, date-ascending with unique dates.
///
/// May be empty: a provider can acknowledge a symbol while returning no
/// usable observations for it, and that emptiness is meaningful downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        let ascending = points.windows(2).all(|pair| pair[0].date < pair[1].date);
        if !ascending {
            return Err(ValidationError::UnorderedSeries {
                symbol: symbol.as_str().to_owned(),
            });
        }
        Ok(Self { symbol, points })
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Equal-weighted portfolio return series: one fractional return per date,
/// date-ascending, gap-free.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReturns {
    pub dates: Vec<Date>,
    pub values: Vec<f64>,
}

impl PortfolioReturns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
