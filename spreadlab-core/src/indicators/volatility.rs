//! Robust volatility: scaled EWMA of absolute first differences.
//!
//! For Gaussian increments E|Δx| = σ·sqrt(2/π), so multiplying the mean
//! absolute change by sqrt(π/2) recovers σ while staying insensitive to
//! single large jumps.

/// EWMA smoothing factor for a half-life expressed in bars.
pub fn halflife_alpha(halflife: f64) -> f64 {
    assert!(
        halflife > 0.0 && halflife.is_finite(),
        "halflife must be positive and finite"
    );
    1.0 - (-(2.0_f64.ln()) / halflife).exp()
}

/// Robust volatility series, same length as `values`.
///
/// Index 0 is NaN (no difference yet). NaN differences are skipped and the
/// previous estimate carries forward.
pub fn robust_volatility(values: &[f64], halflife: f64) -> Vec<f64> {
    let alpha = halflife_alpha(halflife);
    let scale = (std::f64::consts::PI / 2.0).sqrt();
    let mut out = vec![f64::NAN; values.len()];
    let mut ewma: Option<f64> = None;

    for i in 1..values.len() {
        let abs_diff = (values[i] - values[i - 1]).abs();
        if abs_diff.is_finite() {
            ewma = Some(match ewma {
                None => abs_diff,
                Some(prev) => (1.0 - alpha) * prev + alpha * abs_diff,
            });
        }
        if let Some(v) = ewma {
            out[i] = v * scale;
        }
    }

    out
}
