//! Engine configuration and its validation.
//!
//! A run is fully described by one `EngineConfig`: the shared sizing and
//! cadence options plus a tagged strategy section. Validation happens once,
//! before any bar is processed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration. Always fatal, always raised at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("lookback must be >= 2 bars, got {0}")]
    LookbackTooShort(usize),

    #[error("rebalance_period must be >= 1 bar")]
    ZeroRebalancePeriod,

    #[error("order_size must be positive and finite, got {0}")]
    InvalidOrderSize(f64),

    #[error("{name} must be >= 1, got {value}")]
    MultipleBelowOne { name: &'static str, value: u32 },

    #[error("{name} must be >= 2 bars, got {value}")]
    WindowTooShort { name: &'static str, value: usize },

    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("exit_threshold ({exit}) must be below entry_threshold ({entry})")]
    ThresholdOrder { entry: f64, exit: f64 },

    #[error("entry_hold_required must be >= 1")]
    ZeroEntryHold,

    #[error("{name} must lie in [-1, 1], got {value}")]
    AngleOutOfRange { name: &'static str, value: f64 },

    #[error("margin_factor must be positive and finite, got {0}")]
    InvalidMarginFactor(f64),
}

/// Per-strategy options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    /// Spread z-score against a rolling window, immediate exits.
    ZScore {
        entry_threshold: f64,
        exit_threshold: f64,
        window: usize,
    },

    /// Error-correction signal with debounced entries and trend-gated exits.
    Ecm {
        entry_threshold: f64,
        exit_threshold: f64,
        entry_hold_required: u32,
        trend_window: usize,
        /// Bars of spread history used to fit α. Defaults to `lookback`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regression_window: Option<usize>,
    },

    /// Band around a projected price in a rotated basis.
    RotatedBand {
        /// Normalised angle in [-1, 1], mapped to [45°, 135°].
        signal_angle: f64,
        /// Normalised angle in [-1, 1], mapped to [45°, 135°].
        trading_angle: f64,
        margin_factor: f64,
        /// Inventory cap as a multiple of one order, per leg.
        nc2l: u32,
    },
}

impl StrategyConfig {
    pub fn zscore_default() -> Self {
        Self::ZScore {
            entry_threshold: 1.5,
            exit_threshold: 0.5,
            window: 100,
        }
    }

    pub fn ecm_default() -> Self {
        Self::Ecm {
            entry_threshold: 0.00002,
            exit_threshold: 0.000005,
            entry_hold_required: 3,
            trend_window: 5,
            regression_window: None,
        }
    }

    pub fn rotated_band_default() -> Self {
        Self::RotatedBand {
            signal_angle: 0.0,
            trading_angle: 0.0,
            margin_factor: 50.0,
            nc2l: 5,
        }
    }

    /// Short identifier used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZScore { .. } => "z_score",
            Self::Ecm { .. } => "ecm",
            Self::RotatedBand { .. } => "rotated_band",
        }
    }
}

/// Configuration for a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Regression window of the hedge ratio estimator, in bars.
    pub lookback: usize,
    /// Cadence of hedge ratio refreshes and strategy evaluations, in bars.
    pub rebalance_period: usize,
    /// Notional of one order on leg A (z-score, ECM) or contracts along the
    /// trading vector (rotated band).
    pub order_size: f64,
    /// Per-leg notional cap as a multiple of `order_size` (z-score and ECM).
    #[serde(default = "default_inventory_multiple")]
    pub inventory_limit_multiple: u32,
    pub strategy: StrategyConfig,
}

fn default_inventory_multiple() -> u32 {
    2
}

impl EngineConfig {
    pub fn new(
        lookback: usize,
        rebalance_period: usize,
        order_size: f64,
        strategy: StrategyConfig,
    ) -> Self {
        Self {
            lookback,
            rebalance_period,
            order_size,
            inventory_limit_multiple: default_inventory_multiple(),
            strategy,
        }
    }

    /// Lookback 500, rebalance every 15 bars, 1000 per order.
    pub fn with_strategy(strategy: StrategyConfig) -> Self {
        Self::new(500, 15, 1000.0, strategy)
    }

    /// Inventory multiple that applies to the configured strategy.
    pub fn inventory_multiple(&self) -> u32 {
        match self.strategy {
            StrategyConfig::RotatedBand { nc2l, .. } => nc2l,
            _ => self.inventory_limit_multiple,
        }
    }

    /// Check every option against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback < 2 {
            return Err(ConfigError::LookbackTooShort(self.lookback));
        }
        if self.rebalance_period == 0 {
            return Err(ConfigError::ZeroRebalancePeriod);
        }
        if !(self.order_size > 0.0 && self.order_size.is_finite()) {
            return Err(ConfigError::InvalidOrderSize(self.order_size));
        }
        check_multiple("inventory_limit_multiple", self.inventory_limit_multiple)?;

        match self.strategy {
            StrategyConfig::ZScore {
                entry_threshold,
                exit_threshold,
                window,
            } => {
                check_thresholds(entry_threshold, exit_threshold)?;
                check_window("window", window)?;
            }
            StrategyConfig::Ecm {
                entry_threshold,
                exit_threshold,
                entry_hold_required,
                trend_window,
                regression_window,
            } => {
                check_thresholds(entry_threshold, exit_threshold)?;
                if entry_hold_required == 0 {
                    return Err(ConfigError::ZeroEntryHold);
                }
                check_window("trend_window", trend_window)?;
                if let Some(w) = regression_window {
                    check_window("regression_window", w)?;
                }
            }
            StrategyConfig::RotatedBand {
                signal_angle,
                trading_angle,
                margin_factor,
                nc2l,
            } => {
                check_angle("signal_angle", signal_angle)?;
                check_angle("trading_angle", trading_angle)?;
                if !(margin_factor > 0.0 && margin_factor.is_finite()) {
                    return Err(ConfigError::InvalidMarginFactor(margin_factor));
                }
                check_multiple("nc2l", nc2l)?;
            }
        }
        Ok(())
    }
}

fn check_multiple(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value < 1 {
        return Err(ConfigError::MultipleBelowOne { name, value });
    }
    Ok(())
}

fn check_window(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value < 2 {
        return Err(ConfigError::WindowTooShort { name, value });
    }
    Ok(())
}

fn check_thresholds(entry: f64, exit: f64) -> Result<(), ConfigError> {
    for (name, value) in [("entry_threshold", entry), ("exit_threshold", exit)] {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(ConfigError::InvalidThreshold { name, value });
        }
    }
    if exit >= entry {
        return Err(ConfigError::ThresholdOrder { entry, exit });
    }
    Ok(())
}

fn check_angle(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(ConfigError::AngleOutOfRange { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        for strategy in [
            StrategyConfig::zscore_default(),
            StrategyConfig::ecm_default(),
            StrategyConfig::rotated_band_default(),
        ] {
            assert_eq!(EngineConfig::with_strategy(strategy).validate(), Ok(()));
        }
    }

    #[test]
    fn rejects_zero_order_size() {
        let mut cfg = EngineConfig::with_strategy(StrategyConfig::zscore_default());
        cfg.order_size = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidOrderSize(0.0)));
    }

    #[test]
    fn rejects_short_window() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::ZScore {
            entry_threshold: 1.5,
            exit_threshold: 0.5,
            window: 1,
        });
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::WindowTooShort {
                name: "window",
                value: 1
            })
        );
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::ZScore {
            entry_threshold: 0.5,
            exit_threshold: 1.5,
            window: 100,
        });
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn rejects_negative_threshold() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::ZScore {
            entry_threshold: 1.5,
            exit_threshold: -0.1,
            window: 100,
        });
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "exit_threshold",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_entry_hold() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::Ecm {
            entry_threshold: 1e-4,
            exit_threshold: 1e-5,
            entry_hold_required: 0,
            trend_window: 5,
            regression_window: None,
        });
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroEntryHold));
    }

    #[test]
    fn rejects_angle_out_of_range() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::RotatedBand {
            signal_angle: 1.2,
            trading_angle: 0.0,
            margin_factor: 10.0,
            nc2l: 3,
        });
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::AngleOutOfRange {
                name: "signal_angle",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_inventory_multiple() {
        let mut cfg = EngineConfig::with_strategy(StrategyConfig::zscore_default());
        cfg.inventory_limit_multiple = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MultipleBelowOne { .. })
        ));
    }

    #[test]
    fn rotated_band_uses_nc2l() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::rotated_band_default());
        assert_eq!(cfg.inventory_multiple(), 5);
        let cfg = EngineConfig::with_strategy(StrategyConfig::zscore_default());
        assert_eq!(cfg.inventory_multiple(), 2);
    }

    #[test]
    fn strategy_tag_serialization() {
        let cfg = EngineConfig::with_strategy(StrategyConfig::zscore_default());
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"type\":\"Z_SCORE\""));
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn missing_inventory_multiple_defaults_to_two() {
        let json = r#"{
            "lookback": 200,
            "rebalance_period": 10,
            "order_size": 500.0,
            "strategy": {"type": "ROTATED_BAND", "signal_angle": 0.8, "trading_angle": 0.5, "margin_factor": 25.0, "nc2l": 7}
        }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.inventory_limit_multiple, 2);
        assert_eq!(cfg.inventory_multiple(), 7);
        assert_eq!(cfg.validate(), Ok(()));
    }
}
