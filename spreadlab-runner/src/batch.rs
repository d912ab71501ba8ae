//! Parameter grids and the parallel batch driver.
//!
//! Each run is an independent sequential scan; rayon spreads whole runs
//! across threads. The series is shared read-only.

use rayon::prelude::*;
use serde::Serialize;
use spreadlab_core::{EngineConfig, StrategyConfig};
use tracing::{info, warn};

use crate::config::BacktestConfig;
use crate::data_loader::LoadedPair;
use crate::runner::{run_on_pair, BacktestReport, RunError};

/// Parameter grid.
///
/// The Cartesian product of every list is run; an empty list keeps the
/// base config's value for that dimension.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    pub lookbacks: Vec<usize>,
    pub rebalance_periods: Vec<usize>,
    pub strategies: Vec<StrategyConfig>,
}

impl ParamGrid {
    /// Every strategy at its defaults, a few lookback/cadence pairs.
    pub fn default_sweep() -> Self {
        Self {
            lookbacks: vec![250, 500, 1000],
            rebalance_periods: vec![5, 15, 60],
            strategies: vec![
                StrategyConfig::zscore_default(),
                StrategyConfig::ecm_default(),
                StrategyConfig::rotated_band_default(),
            ],
        }
    }

    /// Returns the total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.lookbacks.len().max(1)
            * self.rebalance_periods.len().max(1)
            * self.strategies.len().max(1)
    }

    /// Generates all engine configurations in the grid.
    pub fn generate_configs(&self, base: &EngineConfig) -> Vec<EngineConfig> {
        let lookbacks = or_base(&self.lookbacks, base.lookback);
        let periods = or_base(&self.rebalance_periods, base.rebalance_period);
        let strategies = or_base(&self.strategies, base.strategy.clone());

        let mut configs = Vec::with_capacity(self.size());
        for &lookback in &lookbacks {
            for &rebalance_period in &periods {
                for strategy in &strategies {
                    configs.push(EngineConfig {
                        lookback,
                        rebalance_period,
                        strategy: strategy.clone(),
                        ..base.clone()
                    });
                }
            }
        }
        configs
    }
}

fn or_base<T: Clone>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

/// One line of a batch summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    pub run_id: String,
    pub strategy: String,
    pub lookback: usize,
    pub rebalance_period: usize,
    pub final_pnl: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub rejected_trades: usize,
}

impl BatchRow {
    pub fn from_report(report: &BacktestReport) -> Self {
        Self {
            run_id: report.run_id.clone(),
            strategy: report.result.strategy.clone(),
            lookback: report.config.engine.lookback,
            rebalance_period: report.config.engine.rebalance_period,
            final_pnl: report.metrics.final_pnl,
            sharpe: report.metrics.sharpe,
            max_drawdown: report.metrics.max_drawdown,
            trade_count: report.metrics.trade_count,
            rejected_trades: report.metrics.rejected_trades,
        }
    }
}

/// Run every engine config against the same pair in parallel.
///
/// Output order matches `engines`. Invalid configs fail individually.
pub fn run_batch(
    base: &BacktestConfig,
    pair: &LoadedPair,
    engines: &[EngineConfig],
) -> Vec<Result<BacktestReport, RunError>> {
    info!(runs = engines.len(), bars = pair.bars.len(), "starting batch");
    let results: Vec<Result<BacktestReport, RunError>> = engines
        .par_iter()
        .map(|engine| {
            let config = BacktestConfig {
                engine: engine.clone(),
                ..base.clone()
            };
            run_on_pair(&config, pair)
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, "batch runs rejected");
    }
    info!(runs = results.len(), failed, "batch complete");
    results
}

/// Rows for the successful runs, best final PnL first.
pub fn leaderboard(results: &[Result<BacktestReport, RunError>]) -> Vec<BatchRow> {
    let mut rows: Vec<BatchRow> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(BatchRow::from_report)
        .collect();
    rows.sort_by(|a, b| b.final_pnl.total_cmp(&a.final_pnl));
    rows
}
