//! SpreadLab Runner — configuration files, data loading, metrics, export.
//!
//! This crate builds on `spreadlab-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - CSV loading of aligned two-leg price series
//! - Single-run driver with performance metrics
//! - Parallel batch driver over parameter grids
//! - JSON and CSV artifact export

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use batch::{leaderboard, run_batch, BatchRow, ParamGrid};
pub use config::{BacktestConfig, ConfigError, DataConfig, MetricsConfig, RunId};
pub use data_loader::{load_pair, read_pair, LoadError, LoadedPair};
pub use export::{export_bars_csv, export_batch_csv, export_json, export_records_csv, save_artifacts};
pub use metrics::PerformanceMetrics;
pub use runner::{run_from_config, run_on_pair, BacktestReport, RunError, SCHEMA_VERSION};
