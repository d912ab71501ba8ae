//! PairBar — the fundamental market data unit of a two-leg series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Same-instant prices for both legs of a pair.
///
/// Bars arrive time-ordered with unique timestamps. Alignment and
/// forward-fill are the caller's job; the engine never reorders bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairBar {
    pub timestamp: NaiveDateTime,
    pub price_a: f64,
    pub price_b: f64,
}

impl PairBar {
    pub fn new(timestamp: NaiveDateTime, price_a: f64, price_b: f64) -> Self {
        Self {
            timestamp,
            price_a,
            price_b,
        }
    }

    /// Both prices finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.price_a.is_finite()
            && self.price_b.is_finite()
            && self.price_a > 0.0
            && self.price_b > 0.0
    }

    /// Spread of leg A against leg B for a given hedge ratio.
    pub fn spread(&self, hedge_ratio: f64) -> f64 {
        self.price_a - hedge_ratio * self.price_b
    }
}

/// Extract the leg-A price column.
pub fn leg_a(bars: &[PairBar]) -> Vec<f64> {
    bars.iter().map(|b| b.price_a).collect()
}

/// Extract the leg-B price column.
pub fn leg_b(bars: &[PairBar]) -> Vec<f64> {
    bars.iter().map(|b| b.price_b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> PairBar {
        PairBar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            101.5,
            50.25,
        )
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_rejects_nan_price() {
        let mut bar = sample_bar();
        bar.price_b = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_non_positive_price() {
        let mut bar = sample_bar();
        bar.price_a = 0.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn spread_uses_hedge_ratio() {
        let bar = sample_bar();
        assert_eq!(bar.spread(2.0), 101.5 - 100.5);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: PairBar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
