//! Serializable backtest configuration (TOML on disk).
//!
//! ```toml
//! [data]
//! path = "prices.csv"
//! leg_a = "ES"
//! leg_b = "NQ"
//!
//! [engine]
//! lookback = 500
//! rebalance_period = 15
//! order_size = 1000.0
//!
//! [engine.strategy]
//! type = "Z_SCORE"
//! entry_threshold = 1.5
//! exit_threshold = 0.5
//! window = 100
//!
//! [metrics]
//! periods_per_year = 525600
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spreadlab_core::EngineConfig;
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// One-minute bars, 365 days.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 525_600.0;

/// Half-life (bars) for the robust spread volatility.
pub const DEFAULT_VOLATILITY_HALFLIFE: f64 = 100.0;

/// Errors from reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid engine config: {0}")]
    Engine(#[from] spreadlab_core::ConfigError),
    #[error("{name} must be positive and finite, got {value}")]
    InvalidMetric { name: &'static str, value: f64 },
    #[error("failed to hash config: {0}")]
    Hash(#[from] serde_json::Error),
}

/// Where the price series lives and what the two legs are called.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    /// CSV file with a timestamp column and one price column per leg.
    pub path: PathBuf,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    /// Column header of leg A (the dependent leg).
    pub leg_a: String,
    /// Column header of leg B (the hedge leg).
    pub leg_b: String,
}

fn default_timestamp_column() -> String {
    "timestamp".into()
}

/// Settings for the post-run metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Bars per year, used to annualise the Sharpe ratio.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    #[serde(default = "default_volatility_halflife")]
    pub volatility_halflife: f64,
}

fn default_periods_per_year() -> f64 {
    DEFAULT_PERIODS_PER_YEAR
}

fn default_volatility_halflife() -> f64 {
    DEFAULT_VOLATILITY_HALFLIFE
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            volatility_halflife: DEFAULT_VOLATILITY_HALFLIFE,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("periods_per_year", self.periods_per_year),
            ("volatility_halflife", self.volatility_halflife),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidMetric { name, value });
            }
        }
        Ok(())
    }
}

/// Everything needed to reproduce one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub data: DataConfig,
    pub engine: EngineConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A relative `data.path` is resolved against the
    /// directory holding the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if config.data.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.data.path = dir.join(&config.data.path);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.metrics.validate()
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}
