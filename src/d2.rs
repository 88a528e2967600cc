//! The d2 constant: expected range of a standard normal subgroup.
//!
//! For a subgroup of `n` independent N(0, 1) draws the expected range is
//!
//! ```text
//! d2(n) = ∫ [1 - (1 - Φ(x))^n - Φ(x)^n] dx     over (-∞, +∞)
//! ```
//!
//! The integrand is the probability that `x` lies between the subgroup
//! minimum and maximum. Textbook tables stop at small `n`; integrating gives
//! d2 for any subgroup size. The infinite integral is truncated to a finite
//! grid (default `[-20, 20]` with 1001 points) and evaluated with the
//! trapezoidal rule. At `|x| = 20` both tails are far below `f64` resolution.
//!
//! # References
//!
//! - Tippett, L.H.C. (1925). "On the Extreme Individuals and the Range of
//!   Samples Taken from a Normal Population", *Biometrika* 17(3/4).
//! - ASTM E2587 — Standard Practice for Use of Control Charts.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, trace};

use crate::error::{Result, SpcError};

/// Integration grid used to approximate d2.
///
/// # Examples
///
/// ```
/// use u_spc::d2::{calculate_d2_with, D2Integration};
///
/// let coarse = D2Integration { lower: -10.0, upper: 10.0, points: 401 };
/// let d2 = calculate_d2_with(5, &coarse).unwrap();
/// assert!((d2 - 2.326).abs() < 1e-2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct D2Integration {
    /// Lower truncation bound.
    pub lower: f64,
    /// Upper truncation bound.
    pub upper: f64,
    /// Number of equally spaced grid points, endpoints included.
    pub points: usize,
}

impl Default for D2Integration {
    fn default() -> Self {
        Self {
            lower: -20.0,
            upper: 20.0,
            points: 1001,
        }
    }
}

impl D2Integration {
    /// Checks that the grid spans a finite, non-empty interval with at least
    /// two points.
    pub fn validate(&self) -> Result<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(SpcError::invalid("integration bounds must be finite"));
        }
        if self.lower >= self.upper {
            return Err(SpcError::invalid(format!(
                "integration lower bound ({}) must be below upper bound ({})",
                self.lower, self.upper
            )));
        }
        if self.points < 2 {
            return Err(SpcError::invalid(format!(
                "integration grid needs at least 2 points, got {}",
                self.points
            )));
        }
        Ok(())
    }

    fn step(&self) -> f64 {
        (self.upper - self.lower) / (self.points - 1) as f64
    }
}

/// Computes d2(n) on the default grid.
///
/// `n = 1` yields exactly `0.0`: a single draw has no range. Callers must
/// not divide by that value.
///
/// # Errors
///
/// [`SpcError::InvalidArgument`] when `n == 0`.
///
/// # Examples
///
/// ```
/// use u_spc::calculate_d2;
///
/// // Closed form for n = 2 is 2 / sqrt(pi).
/// let d2 = calculate_d2(2).unwrap();
/// assert!((d2 - 2.0 / std::f64::consts::PI.sqrt()).abs() < 1e-3);
///
/// assert_eq!(calculate_d2(1).unwrap(), 0.0);
/// assert!(calculate_d2(0).is_err());
/// ```
pub fn calculate_d2(n: usize) -> Result<f64> {
    calculate_d2_with(n, &D2Integration::default())
}

/// Computes d2(n) on a caller-supplied grid.
///
/// # Errors
///
/// [`SpcError::InvalidArgument`] when `n == 0`, when `n` does not fit the
/// exponent range, or when the grid is invalid.
pub fn calculate_d2_with(n: usize, integration: &D2Integration) -> Result<f64> {
    if n == 0 {
        return Err(SpcError::invalid("subgroup size must be at least 1"));
    }
    integration.validate()?;
    if n == 1 {
        return Ok(0.0);
    }
    let exponent = i32::try_from(n)
        .map_err(|_| SpcError::invalid(format!("subgroup size {n} is too large")))?;

    let standard = Normal::new(0.0, 1.0).map_err(|e| {
        SpcError::invalid(format!("failed to construct standard normal: {e}"))
    })?;

    let step = integration.step();
    let last = integration.points - 1;
    let mut sum = 0.0;
    for i in 0..integration.points {
        let x = integration.lower + step * i as f64;
        // sf(x) keeps precision in the upper tail where 1 - cdf(x) cancels.
        let covered = 1.0 - standard.sf(x).powi(exponent) - standard.cdf(x).powi(exponent);
        let weight = if i == 0 || i == last { 0.5 } else { 1.0 };
        sum += weight * covered;
    }
    let d2 = sum * step;

    trace!(n, points = integration.points, d2, "integrated d2");
    Ok(d2)
}

/// Precomputed d2 values for subgroup sizes `1..=max_n`.
///
/// Useful when many window sizes are evaluated against the same grid. The
/// table is immutable once built and may be shared freely.
///
/// # Examples
///
/// ```
/// use u_spc::d2::D2Table;
///
/// let table = D2Table::new(10).unwrap();
/// assert_eq!(table.max_n(), 10);
/// assert!((table.get(10).unwrap() - 3.078).abs() < 1e-2);
/// assert!(table.get(0).is_none());
/// assert!(table.get(11).is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct D2Table {
    /// `values[i]` is d2(i + 1).
    values: Vec<f64>,
}

impl D2Table {
    /// Builds a table for `1..=max_n` on the default grid.
    pub fn new(max_n: usize) -> Result<Self> {
        Self::with_integration(max_n, &D2Integration::default())
    }

    /// Builds a table for `1..=max_n` on a caller-supplied grid.
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidArgument`] when `max_n == 0` or the grid is invalid.
    pub fn with_integration(max_n: usize, integration: &D2Integration) -> Result<Self> {
        if max_n == 0 {
            return Err(SpcError::invalid("d2 table must cover at least n = 1"));
        }
        let values = (1..=max_n)
            .map(|n| calculate_d2_with(n, integration))
            .collect::<Result<Vec<_>>>()?;
        debug!(max_n, points = integration.points, "built d2 table");
        Ok(Self { values })
    }

    /// d2(n), or `None` when `n` is 0 or beyond the table.
    pub fn get(&self, n: usize) -> Option<f64> {
        n.checked_sub(1).and_then(|i| self.values.get(i).copied())
    }

    /// Largest subgroup size in the table.
    pub fn max_n(&self) -> usize {
        self.values.len()
    }
}
