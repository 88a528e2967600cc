//! Conformance of samples to a fitted normal model.
//!
//! Each sample gets its two-sided tail probability under N(mean, std),
//!
//! ```text
//! p(s) = 2 * min(Φ(s), 1 - Φ(s))
//! ```
//!
//! and the scores are averaged. This is not a classical single-statistic
//! hypothesis test: it is a mean "surprise" score. Values near 1 mean the
//! samples sit near the center of the model, values near 0 mean they sit in
//! its tails.
//!
//! The mean and standard deviation are supplied by the caller rather than
//! re-estimated, so robust or trimmed estimates can be plugged in.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{ensure_finite_samples, Result, SpcError};

/// Mean two-sided tail probability of `samples` under N(`mean`, `std`).
///
/// # Errors
///
/// [`SpcError::InvalidArgument`] if `samples` is empty or contains a
/// non-finite value, if `mean` is not finite, or if `std` is not a positive
/// finite number.
///
/// # Examples
///
/// ```
/// use u_spc::calculate_p_value;
///
/// // A sample at the mean is maximally conforming.
/// let p = calculate_p_value(0.0, 1.0, &[0.0]).unwrap();
/// assert!((p - 1.0).abs() < 1e-12);
///
/// // About 31.7% of a normal lies beyond one sigma.
/// let p = calculate_p_value(0.0, 1.0, &[1.0, -1.0]).unwrap();
/// assert!((p - 0.3173).abs() < 1e-3);
///
/// assert!(calculate_p_value(0.0, 0.0, &[1.0]).is_err());
/// ```
pub fn calculate_p_value(mean: f64, std: f64, samples: &[f64]) -> Result<f64> {
    if !mean.is_finite() {
        return Err(SpcError::invalid(format!("mean must be finite, got {mean}")));
    }
    if !std.is_finite() || std <= 0.0 {
        return Err(SpcError::invalid(format!(
            "standard deviation must be positive and finite, got {std}"
        )));
    }
    ensure_finite_samples(samples)?;

    let model = Normal::new(mean, std)
        .map_err(|e| SpcError::invalid(format!("failed to fit normal model: {e}")))?;

    let total: f64 = samples
        .iter()
        .map(|&s| 2.0 * model.cdf(s).min(model.sf(s)))
        .sum();
    Ok(total / samples.len() as f64)
}
