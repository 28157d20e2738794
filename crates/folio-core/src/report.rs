//! Final report assembly.
//!
//! The assembler only packages upstream results; it introduces no failure
//! modes of its own. The cumulative series is a derived view recomputed
//! from the daily series on every call, never stored state.

use crate::domain::PortfolioReturns;
use crate::stats::SummaryStatistics;

/// Everything the presentation layer needs for one analyzed portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    /// Free-text analysis from the language-model collaborator.
    pub analysis: String,
    /// Daily equal-weighted portfolio returns.
    pub daily_returns: PortfolioReturns,
    /// Compounded growth of one unit, minus one, per date.
    pub cumulative_returns: Vec<f64>,
    /// Statistics embedded in the analysis prompt.
    pub statistics: SummaryStatistics,
}

impl PortfolioReport {
    pub fn assemble(
        analysis: String,
        daily_returns: PortfolioReturns,
        statistics: SummaryStatistics,
    ) -> Self {
        let cumulative_returns = cumulative_returns(&daily_returns.values);
        Self {
            analysis,
            daily_returns,
            cumulative_returns,
            statistics,
        }
    }
}

/// Cumulative return at each step: prod(1 + r[0..=t]) - 1.
pub fn cumulative_returns(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut growth = 1.0;
    for r in values {
        if r.is_finite() {
            growth *= 1.0 + *r;
        }
        out.push(growth - 1.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn cumulative_compounds_daily_returns() {
        let cumulative = cumulative_returns(&[0.10, 0.10]);
        assert!((cumulative[0] - 0.10).abs() < 1e-12);
        assert!((cumulative[1] - 0.21).abs() < 1e-12);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let daily = [0.01, -0.02, 0.03, 0.0];
        assert_eq!(cumulative_returns(&daily), cumulative_returns(&daily));
    }

    #[test]
    fn assemble_derives_cumulative_from_daily() {
        let daily = PortfolioReturns {
            dates: vec![date!(2024 - 01 - 02), date!(2024 - 01 - 03)],
            values: vec![0.10, 0.10],
        };
        let stats = SummaryStatistics::from_returns(&daily);
        let report = PortfolioReport::assemble("fine".to_owned(), daily, stats);

        assert_eq!(report.cumulative_returns.len(), report.daily_returns.len());
        assert!((report.cumulative_returns[1] - 0.21).abs() < 1e-12);
    }
}
