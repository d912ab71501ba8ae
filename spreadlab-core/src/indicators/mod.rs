//! Statistical primitives used by the estimator and the strategies.
//!
//! All functions are pure: slices in, numbers or series out. Series outputs
//! have the same length as their input and carry NaN through warmup.

pub mod half_life;
pub mod ols;
pub mod rolling;
pub mod volatility;

pub use half_life::{estimate_half_life, reversion_speed};
pub use ols::{fit_ols, hedge_angle_degrees, OlsFit};
pub use rolling::{rolling_mean_std, window_mean_std, zscore};
pub use volatility::{halflife_alpha, robust_volatility};

/// Create synthetic pair bars from leg prices for testing.
///
/// Timestamps start at 2024-01-02 00:00 and advance one minute per bar.
#[cfg(test)]
pub fn make_pair_bars(prices_a: &[f64], prices_b: &[f64]) -> Vec<crate::domain::PairBar> {
    use crate::domain::PairBar;
    assert_eq!(prices_a.len(), prices_b.len(), "legs must have equal length");
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    prices_a
        .iter()
        .zip(prices_b)
        .enumerate()
        .map(|(i, (&a, &b))| PairBar::new(base + chrono::Duration::minutes(i as i64), a, b))
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
