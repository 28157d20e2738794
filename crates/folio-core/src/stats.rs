//! Descriptive statistics over the portfolio return series.
//!
//! The textual layout mirrors the eight-line describe() table the analysis
//! prompt embeds: count, mean, std, min, quartiles, max, one per line with
//! right-aligned values.

use crate::domain::PortfolioReturns;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl SummaryStatistics {
    /// Compute statistics over the finite values of a return series.
    ///
    /// Standard deviation is the sample estimate (n-1); quartiles use
    /// linear interpolation between adjacent order statistics.
    pub fn from_returns(returns: &PortfolioReturns) -> Self {
        Self::from_values(&returns.values)
    }

    pub fn from_values(values: &[f64]) -> Self {
        let mut clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        clean.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = clean.len();
        if n == 0 {
            return Self {
                count: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                q1: 0.0,
                median: 0.0,
                q3: 0.0,
                max: 0.0,
            };
        }

        let mean = clean.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            0.0
        } else {
            let var = clean
                .iter()
                .map(|v| {
                    let d = v - mean;
                    d * d
                })
                .sum::<f64>()
                / (n as f64 - 1.0);
            var.sqrt()
        };

        Self {
            count: n,
            mean,
            std,
            min: clean[0],
            q1: percentile(&clean, 0.25),
            median: percentile(&clean, 0.5),
            q3: percentile(&clean, 0.75),
            max: clean[n - 1],
        }
    }

    /// Render the fixed eight-line table embedded in the analysis prompt.
    pub fn to_text(&self) -> String {
        let rows = [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q1),
            ("50%", self.median),
            ("75%", self.q3),
            ("max", self.max),
        ];

        rows.iter()
            .map(|(label, value)| format!("{label:<5}{value:>15.6}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let clamped = p.clamp(0.0, 1.0);
    let pos = clamped * (sorted.len() as f64 - 1.0);
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx + 1 >= sorted.len() {
        sorted[idx]
    } else {
        sorted[idx] + (sorted[idx + 1] - sorted[idx]) * frac
    }
}
