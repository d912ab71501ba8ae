//! Per-bar output records and run result types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Direction;

/// Engine output for one input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub timestamp: NaiveDateTime,
    pub price_a: f64,
    pub price_b: f64,
    /// NaN until the first successful regression.
    pub hedge_ratio: f64,
    /// Bar index of the refit that produced `hedge_ratio`.
    pub ratio_as_of: Option<usize>,
    pub hedge_angle: f64,
    pub spread: f64,
    pub signal: f64,
    pub direction: Direction,
    pub position_a: f64,
    pub position_b: f64,
    /// Market value of each leg at this bar's price.
    pub inventory_a: f64,
    pub inventory_b: f64,
    /// Cumulative PnL.
    pub pnl: f64,
    /// Band edges for band strategies, NaN otherwise.
    pub band_lower: f64,
    pub band_upper: f64,
    /// False during warmup: no signal, no trading.
    pub active: bool,
}

/// Scalar summaries of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_pnl: f64,
    /// Bars at which the held direction differs from the previous bar.
    pub direction_changes: usize,
    /// Accepted fills.
    pub trade_count: usize,
    /// Intents rejected by the inventory cap.
    pub rejected_trades: usize,
    /// Regression windows with no variance in leg B.
    pub degenerate_windows: usize,
    pub active_bars: usize,
}

/// Complete output of one run, aligned 1:1 with the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy: String,
    pub records: Vec<BarRecord>,
    pub summary: RunSummary,
    /// Fewer bars than the lookback; every record is inactive.
    pub insufficient_data: bool,
}

impl RunResult {
    /// Index of the first active bar.
    pub fn first_active(&self) -> Option<usize> {
        self.records.iter().position(|r| r.active)
    }

    /// Records from the first active bar onward (warmup trimmed).
    pub fn trimmed(&self) -> &[BarRecord] {
        match self.first_active() {
            Some(i) => &self.records[i..],
            None => &[],
        }
    }

    pub fn pnl_series(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.pnl).collect()
    }

    /// Bars at which the held position changed.
    pub fn trade_bars(&self) -> Vec<usize> {
        self.records
            .windows(2)
            .enumerate()
            .filter(|(_, w)| {
                w[0].position_a != w[1].position_a || w[0].position_b != w[1].position_b
            })
            .map(|(i, _)| i + 1)
            .collect()
    }
}

/// Count of bars whose direction differs from the bar before.
pub fn count_direction_changes(records: &[BarRecord]) -> usize {
    records
        .windows(2)
        .filter(|w| w[0].direction != w[1].direction)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(direction: Direction, position_a: f64, active: bool) -> BarRecord {
        BarRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            price_a: 1.0,
            price_b: 1.0,
            hedge_ratio: f64::NAN,
            ratio_as_of: None,
            hedge_angle: f64::NAN,
            spread: f64::NAN,
            signal: f64::NAN,
            direction,
            position_a,
            position_b: -position_a,
            inventory_a: position_a,
            inventory_b: -position_a,
            pnl: 0.0,
            band_lower: f64::NAN,
            band_upper: f64::NAN,
            active,
        }
    }

    fn result(records: Vec<BarRecord>) -> RunResult {
        RunResult {
            strategy: "z_score".into(),
            records,
            summary: RunSummary::default(),
            insufficient_data: false,
        }
    }

    #[test]
    fn trimmed_starts_at_first_active() {
        let r = result(vec![
            record(Direction::Flat, 0.0, false),
            record(Direction::Flat, 0.0, false),
            record(Direction::Flat, 0.0, true),
        ]);
        assert_eq!(r.first_active(), Some(2));
        assert_eq!(r.trimmed().len(), 1);
    }

    #[test]
    fn trimmed_empty_when_never_active() {
        let r = result(vec![record(Direction::Flat, 0.0, false)]);
        assert!(r.trimmed().is_empty());
    }

    #[test]
    fn trade_bars_and_direction_changes() {
        let records = vec![
            record(Direction::Flat, 0.0, true),
            record(Direction::LongSpread, 2.0, true),
            record(Direction::LongSpread, 2.0, true),
            record(Direction::Flat, 0.0, true),
        ];
        assert_eq!(count_direction_changes(&records), 2);
        assert_eq!(result(records).trade_bars(), vec![1, 3]);
    }
}
