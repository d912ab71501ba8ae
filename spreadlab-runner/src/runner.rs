//! Backtest runner — wires together config, data, engine, and metrics.
//!
//! Two entry points:
//! - `run_from_config()`: loads the CSV named in the config, then runs. Used by CLI.
//! - `run_on_pair()`: takes a pre-loaded pair. Used by the batch driver so the
//!   series is read once for many configurations.

use serde::Serialize;
use spreadlab_core::{Backtest, RunResult};
use thiserror::Error;
use tracing::info;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_pair, LoadError, LoadedPair};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

impl From<spreadlab_core::ConfigError> for RunError {
    fn from(e: spreadlab_core::ConfigError) -> Self {
        RunError::Config(ConfigError::Engine(e))
    }
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single run, ready for export.
///
/// Float fields that are undefined (warmup, non-reverting spreads) are NaN
/// and serialise to JSON `null`.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: BacktestConfig,
    pub leg_a: String,
    pub leg_b: String,
    pub dataset_hash: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub bar_count: usize,
    pub metrics: PerformanceMetrics,
    pub result: RunResult,
}

/// Load the configured series and run it.
pub fn run_from_config(config: &BacktestConfig) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let pair = load_pair(&config.data)?;
    run_on_pair(config, &pair)
}

/// Run a configuration against a pre-loaded pair — no I/O.
pub fn run_on_pair(config: &BacktestConfig, pair: &LoadedPair) -> Result<BacktestReport, RunError> {
    let run_id = config.run_id()?;
    config.metrics.validate()?;
    let engine = Backtest::new(config.engine.clone())?;

    let result = engine.run(&pair.bars);
    let metrics = PerformanceMetrics::compute(&result, &config.metrics);
    info!(
        run_id = %&run_id[..12],
        strategy = %result.strategy,
        final_pnl = metrics.final_pnl,
        sharpe = metrics.sharpe,
        trades = metrics.trade_count,
        "run complete"
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        leg_a: pair.leg_a.clone(),
        leg_b: pair.leg_b.clone(),
        dataset_hash: pair.dataset_hash.clone(),
        start: pair.bars.first().map(|b| b.timestamp.to_string()),
        end: pair.bars.last().map(|b| b.timestamp.to_string()),
        bar_count: pair.bars.len(),
        metrics,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataConfig, MetricsConfig};
    use crate::data_loader::compute_dataset_hash;
    use spreadlab_core::synthetic::{generate_pair, SyntheticPairConfig};
    use spreadlab_core::{EngineConfig, StrategyConfig};
    use std::path::PathBuf;

    fn pair(bars: usize) -> LoadedPair {
        let bars = generate_pair(&SyntheticPairConfig {
            bars,
            ..Default::default()
        });
        LoadedPair {
            dataset_hash: compute_dataset_hash(&bars),
            bars,
            leg_a: "A".into(),
            leg_b: "B".into(),
        }
    }

    fn config(engine: EngineConfig) -> BacktestConfig {
        BacktestConfig {
            data: DataConfig {
                path: PathBuf::from("unused.csv"),
                timestamp_column: "timestamp".into(),
                leg_a: "A".into(),
                leg_b: "B".into(),
            },
            engine,
            metrics: MetricsConfig::default(),
        }
    }

    #[test]
    fn report_carries_provenance() {
        let pair = pair(800);
        let cfg = config(EngineConfig::new(
            200,
            10,
            1000.0,
            StrategyConfig::ecm_default(),
        ));
        let report = run_on_pair(&cfg, &pair).unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.run_id, cfg.run_id().unwrap());
        assert_eq!(report.bar_count, 800);
        assert_eq!(report.result.records.len(), 800);
        assert_eq!(report.result.strategy, "ecm");
        assert_eq!(report.dataset_hash, pair.dataset_hash);
        assert_eq!(report.start.as_deref(), Some("2024-01-01 00:00:00"));
    }

    #[test]
    fn invalid_engine_is_config_error() {
        let cfg = config(EngineConfig::new(
            200,
            0,
            1000.0,
            StrategyConfig::zscore_default(),
        ));
        let err = run_on_pair(&cfg, &pair(10)).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::Engine(_))));
    }

    #[test]
    fn missing_data_is_data_error() {
        let mut cfg = config(EngineConfig::with_strategy(StrategyConfig::zscore_default()));
        cfg.data.path = PathBuf::from("/definitely/not/here.csv");
        assert!(matches!(run_from_config(&cfg), Err(RunError::Data(_))));
    }
}
