//! Performance metrics — pure functions over a finished run.
//!
//! PnL here is absolute (currency units, no capital base), so drawdown is a
//! currency amount and the Sharpe ratio is computed from per-bar PnL
//! increments rather than returns.

use serde::{Deserialize, Serialize};
use spreadlab_core::indicators::{estimate_half_life, robust_volatility};
use spreadlab_core::RunResult;

use crate::config::MetricsConfig;

/// Aggregate metrics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub final_pnl: f64,
    /// Largest peak-to-trough fall of cumulative PnL, as a value <= 0.
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub trade_count: usize,
    pub direction_changes: usize,
    pub rejected_trades: usize,
    pub active_bars: usize,
    /// Mean-reversion half-life of the active spread, bars. NaN if the
    /// spread does not revert.
    pub spread_half_life: f64,
    /// Robust volatility of the spread at the last bar.
    pub spread_volatility: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a run. Warmup bars are excluded from the
    /// series statistics.
    pub fn compute(result: &RunResult, config: &MetricsConfig) -> Self {
        let active = result.trimmed();
        let pnl: Vec<f64> = active.iter().map(|r| r.pnl).collect();
        let spread: Vec<f64> = active.iter().map(|r| r.spread).collect();

        Self {
            final_pnl: result.summary.final_pnl,
            max_drawdown: max_drawdown(&pnl),
            sharpe: sharpe_ratio(&pnl_increments(&pnl), config.periods_per_year),
            trade_count: result.summary.trade_count,
            direction_changes: result.summary.direction_changes,
            rejected_trades: result.summary.rejected_trades,
            active_bars: result.summary.active_bars,
            spread_half_life: estimate_half_life(&spread),
            spread_volatility: last_volatility(&spread, config.volatility_halflife),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Maximum drawdown of a cumulative PnL curve, in PnL units (<= 0).
///
/// Returns 0.0 if the curve never falls below a previous peak.
pub fn max_drawdown(pnl: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &p in pnl {
        if p > peak {
            peak = p;
        }
        let dd = p - peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Annualised Sharpe ratio of per-bar PnL increments.
///
/// Sharpe = mean / std * sqrt(periods_per_year). Returns 0.0 if there are
/// fewer than 2 increments or no variance.
pub fn sharpe_ratio(increments: &[f64], periods_per_year: f64) -> f64 {
    if increments.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(increments);
    let std = std_dev(increments);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Bar-to-bar changes of a cumulative PnL curve.
pub fn pnl_increments(pnl: &[f64]) -> Vec<f64> {
    pnl.windows(2).map(|w| w[1] - w[0]).collect()
}

fn last_volatility(spread: &[f64], halflife: f64) -> f64 {
    robust_volatility(spread, halflife)
        .last()
        .copied()
        .unwrap_or(f64::NAN)
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
