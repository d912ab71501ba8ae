//! Half-life of mean reversion (Ornstein-Uhlenbeck approximation).
//!
//! Regress Δs_t on s_{t-1}: Δs_t = c + λ·s_{t-1}. A stationary spread has
//! λ < 0 and half-life -ln(2)/λ bars.

use super::ols::fit_ols;

/// Minimum number of non-NaN spread observations.
pub const MIN_OBSERVATIONS: usize = 10;

/// Half-lives above this many bars are treated as non-reverting.
pub const MAX_HALF_LIFE: f64 = 5_000.0;

/// Mean-reversion speed λ of a spread. `None` if the regression is degenerate.
pub fn reversion_speed(spread: &[f64]) -> Option<f64> {
    if spread.len() < 2 {
        return None;
    }
    let lagged = &spread[..spread.len() - 1];
    let changes: Vec<f64> = spread.windows(2).map(|w| w[1] - w[0]).collect();
    fit_ols(lagged, &changes).map(|fit| fit.slope)
}

/// Estimated half-life in bars, or NaN when the spread does not revert.
pub fn estimate_half_life(spread: &[f64]) -> f64 {
    let clean: Vec<f64> = spread.iter().copied().filter(|v| !v.is_nan()).collect();
    if clean.len() < MIN_OBSERVATIONS {
        return f64::NAN;
    }

    let lambda = match reversion_speed(&clean) {
        Some(l) => l,
        None => return f64::NAN,
    };
    if lambda >= 0.0 || !lambda.is_finite() {
        return f64::NAN;
    }

    let half_life = -(2.0_f64.ln()) / lambda;
    if half_life > MAX_HALF_LIFE {
        return f64::NAN;
    }
    half_life
}
