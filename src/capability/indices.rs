//! Process capability (Cpk) and performance (Ppk) from a measurement series.
//!
//! Long-term performance (Ppk) uses the overall sample standard deviation.
//! Short-term capability (Cpk) uses the within-subgroup sigma estimated from
//! rolling ranges, R-bar / d2(window), which assumes the process is in
//! statistical control within each subgroup.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

use super::rolling::moving_ranges;
use crate::d2::{calculate_d2_with, D2Integration};
use crate::error::{ensure_finite_samples, Result, SpcError};

/// Subgroup size used when the caller does not choose one.
pub const DEFAULT_WINDOW: usize = 8;

/// Summary of one capability analysis.
///
/// Field order is fixed and matches the serialized key order.
///
/// Indices follow IEEE 754 division. Zero variation is not rejected: a
/// constant series strictly inside the limits yields `+inf` for both `ppk`
/// and `cpk`, and `-inf` when it lies outside. When the mean sits exactly on
/// a limit with zero variation the one-sided index is 0/0 and the combined
/// index is NaN.
///
/// | Index | Value | Interpretation |
/// |-------|-------|----------------|
/// | Cpk/Ppk | >= 1.33 | Process is capable and centered |
/// | Cpk/Ppk | < 1.0 | Process produces out-of-spec parts |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    /// Number of samples analysed.
    #[serde(rename = "sample size")]
    pub sample_size: usize,
    /// Overall mean.
    pub mean: f64,
    /// Overall sample standard deviation (n - 1 denominator).
    pub std: f64,
    /// Within-subgroup sigma, R-bar / d2(window).
    pub std_within: f64,
    /// min(Ppu, Ppl) using `std`.
    pub ppk: f64,
    /// min(Cpu, Cpl) using `std_within`.
    pub cpk: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
}

/// Settings for a [`ProcessAnalyzer`].
///
/// Missing fields take their defaults when deserialized:
///
/// ```
/// use u_spc::capability::AnalyzerConfig;
///
/// let config: AnalyzerConfig = serde_json::from_str(r#"{ "window": 5 }"#).unwrap();
/// assert_eq!(config.window, 5);
/// assert_eq!(config.integration.points, 1001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Rolling subgroup size, also the `n` passed to d2. Must be >= 2.
    pub window: usize,
    /// Grid for the d2 integration.
    pub integration: D2Integration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            integration: D2Integration::default(),
        }
    }
}

/// Reusable capability analyzer.
///
/// d2 is integrated once at construction, so analysing many series with the
/// same window costs only the rolling scan.
///
/// # Examples
///
/// ```
/// use u_spc::capability::ProcessAnalyzer;
///
/// let analyzer = ProcessAnalyzer::default().with_window(2).unwrap();
/// let data = [9.5, 10.0, 10.2, 9.8, 10.1, 10.3, 9.9, 10.0];
///
/// let summary = analyzer.analyze(&data, 9.0, 11.0).unwrap();
/// assert_eq!(summary.sample_size, 8);
/// assert!(summary.ppk > 1.0);
/// assert!(summary.cpk > 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessAnalyzer {
    config: AnalyzerConfig,
    d2: f64,
}

impl ProcessAnalyzer {
    /// Validates `config` and precomputes d2(window).
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidArgument`] if `config.window < 2` or the
    /// integration grid is invalid.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        if config.window < 2 {
            return Err(SpcError::invalid(format!(
                "window must be at least 2 to form a range, got {}",
                config.window
            )));
        }
        let d2 = calculate_d2_with(config.window, &config.integration)?;
        Ok(Self { config, d2 })
    }

    /// Returns an analyzer with a different window and the same grid.
    pub fn with_window(self, window: usize) -> Result<Self> {
        Self::new(AnalyzerConfig {
            window,
            ..self.config
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// d2(window) used to convert R-bar into sigma.
    pub fn d2(&self) -> f64 {
        self.d2
    }

    /// Computes the capability summary of `samples` against `[lsl, usl]`.
    ///
    /// `lsl < usl` is the caller's responsibility; an inverted pair is
    /// logged and the indices are computed as given.
    ///
    /// # Errors
    ///
    /// - [`SpcError::InvalidArgument`] if `samples` is empty or contains a
    ///   non-finite value.
    /// - [`SpcError::InsufficientData`] if `samples` is shorter than the
    ///   window.
    pub fn analyze(&self, samples: &[f64], lsl: f64, usl: f64) -> Result<ProcessSummary> {
        ensure_finite_samples(samples)?;
        let window = self.config.window;
        if samples.len() < window {
            return Err(SpcError::InsufficientData {
                required: window,
                available: samples.len(),
            });
        }
        if lsl >= usl {
            warn!(lsl, usl, "lower spec limit is not below upper spec limit");
        }

        let min = Statistics::min(samples);
        let max = Statistics::max(samples);
        // One-pass variance leaves rounding residue on constant non-dyadic data.
        let (mean, std) = if min == max {
            (min, 0.0)
        } else {
            (Statistics::mean(samples), Statistics::std_dev(samples))
        };

        let ranges = moving_ranges(samples, window);
        let r_bar = Statistics::mean(&ranges);
        let std_within = r_bar / self.d2;

        let summary = ProcessSummary {
            sample_size: samples.len(),
            mean,
            std,
            std_within,
            ppk: capability_index(mean, std, lsl, usl),
            cpk: capability_index(mean, std_within, lsl, usl),
            min,
            max,
        };

        debug!(
            sample_size = summary.sample_size,
            window,
            mean = summary.mean,
            std = summary.std,
            std_within = summary.std_within,
            ppk = summary.ppk,
            cpk = summary.cpk,
            "process capability computed"
        );
        Ok(summary)
    }
}

impl Default for ProcessAnalyzer {
    /// Window of [`DEFAULT_WINDOW`] on the default integration grid.
    fn default() -> Self {
        Self::new(AnalyzerConfig::default()).expect("default analyzer config is valid")
    }
}

/// Computes the capability summary with a rolling window of `window`.
///
/// Pass [`DEFAULT_WINDOW`] for the conventional subgroup size of 8.
///
/// # Errors
///
/// - [`SpcError::InvalidArgument`] if `window < 2`, or `samples` is empty or
///   contains a non-finite value.
/// - [`SpcError::InsufficientData`] if `window > samples.len()`.
///
/// # Examples
///
/// ```
/// use u_spc::calculate_process;
///
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
/// let summary = calculate_process(&data, 0.0, 9.0, 4).unwrap();
///
/// assert!((summary.mean - 4.5).abs() < 1e-12);
/// assert_eq!(summary.min, 1.0);
/// assert_eq!(summary.max, 8.0);
/// ```
pub fn calculate_process(
    samples: &[f64],
    lsl: f64,
    usl: f64,
    window: usize,
) -> Result<ProcessSummary> {
    ProcessAnalyzer::new(AnalyzerConfig {
        window,
        ..AnalyzerConfig::default()
    })?
    .analyze(samples, lsl, usl)
}

/// min((usl - mean) / 3σ, (mean - lsl) / 3σ), NaN if either side is NaN.
fn capability_index(mean: f64, sigma: f64, lsl: f64, usl: f64) -> f64 {
    let upper = (usl - mean) / (3.0 * sigma);
    let lower = (mean - lsl) / (3.0 * sigma);
    if upper.is_nan() || lower.is_nan() {
        f64::NAN
    } else {
        upper.min(lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d2::calculate_d2;

    // -----------------------------------------------------------------------
    // Hand-computed example
    // -----------------------------------------------------------------------

    /// mean = 9.975, std = 0.249285, moving ranges (n=2) average 0.3.
    ///
    /// Ppk = min(1.025, 0.975) / (3 * 0.249285) = 1.30374
    /// Cpk = min(1.025, 0.975) / (3 * 0.3 / d2(2))
    #[test]
    fn hand_computed_indices() {
        let data = [9.5, 10.0, 10.2, 9.8, 10.1, 10.3, 9.9, 10.0];
        let s = calculate_process(&data, 9.0, 11.0, 2).unwrap();

        let mean = 9.975;
        let std = 0.249_284_690_951_644_9;
        assert!((s.mean - mean).abs() < 1e-12, "mean {}", s.mean);
        assert!((s.std - std).abs() < 1e-12, "std {}", s.std);

        let expected_ppk = ((11.0 - mean) / (3.0 * std)).min((mean - 9.0) / (3.0 * std));
        assert!(
            (s.ppk - expected_ppk).abs() < 1e-9,
            "Ppk: expected {expected_ppk}, got {}",
            s.ppk
        );
        assert!((s.ppk - 1.30374).abs() < 1e-4);

        let std_within = 0.3 / calculate_d2(2).unwrap();
        assert!(
            (s.std_within - std_within).abs() < 1e-12,
            "std_within: expected {std_within}, got {}",
            s.std_within
        );
        let expected_cpk = (mean - 9.0) / (3.0 * std_within);
        assert!(
            (s.cpk - expected_cpk).abs() < 1e-12,
            "Cpk: expected {expected_cpk}, got {}",
            s.cpk
        );
        assert_eq!(s.min, 9.5);
        assert_eq!(s.max, 10.3);
        assert_eq!(s.sample_size, 8);
    }

    #[test]
    fn ascending_series_window_four() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let s = calculate_process(&data, 0.0, 9.0, 4).unwrap();
        let expected = 3.0 / calculate_d2(4).unwrap();
        assert!(
            (s.std_within - expected).abs() < 1e-12,
            "std_within: expected {expected}, got {}",
            s.std_within
        );
    }

    // -----------------------------------------------------------------------
    // Zero variation
    // -----------------------------------------------------------------------

    #[test]
    fn constant_series_inside_limits_is_infinitely_capable() {
        let data = [5.0; 12];
        let s = calculate_process(&data, 0.0, 10.0, DEFAULT_WINDOW).unwrap();
        assert_eq!(s.std, 0.0);
        assert_eq!(s.std_within, 0.0);
        assert_eq!(s.ppk, f64::INFINITY);
        assert_eq!(s.cpk, f64::INFINITY);
    }

    #[test]
    fn constant_non_dyadic_series_has_zero_spread() {
        for v in [0.1, 3.3, 9.97, 10.1] {
            let data = [v; 12];
            let s = calculate_process(&data, 0.0, 20.0, DEFAULT_WINDOW).unwrap();
            assert_eq!(s.mean, v);
            assert_eq!(s.std, 0.0, "std for constant {v}");
            assert_eq!(s.std_within, 0.0, "std_within for constant {v}");
            assert_eq!(s.ppk, f64::INFINITY, "Ppk for constant {v}");
            assert_eq!(s.cpk, f64::INFINITY, "Cpk for constant {v}");
        }
    }

    #[test]
    fn constant_series_outside_limits_is_negative_infinity() {
        let data = [12.0; 10];
        let s = calculate_process(&data, 0.0, 10.0, 4).unwrap();
        assert_eq!(s.ppk, f64::NEG_INFINITY);
        assert_eq!(s.cpk, f64::NEG_INFINITY);
    }

    #[test]
    fn constant_series_on_a_limit_is_nan() {
        let data = [10.0; 10];
        let s = calculate_process(&data, 0.0, 10.0, 4).unwrap();
        assert!(s.ppk.is_nan());
        assert!(s.cpk.is_nan());
    }

    // -----------------------------------------------------------------------
    // Order sensitivity
    // -----------------------------------------------------------------------

    #[test]
    fn reordering_changes_only_within_sigma() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let shuffled = [1.0, 8.0, 2.0, 7.0, 3.0, 6.0, 4.0, 5.0];

        let a = calculate_process(&sorted, 0.0, 9.0, 3).unwrap();
        let b = calculate_process(&shuffled, 0.0, 9.0, 3).unwrap();

        assert!((a.mean - b.mean).abs() < 1e-12);
        assert!((a.std - b.std).abs() < 1e-12);
        assert_eq!(a.min, b.min);
        assert_eq!(a.max, b.max);
        assert!((a.ppk - b.ppk).abs() < 1e-12);
        assert!(
            (a.std_within - b.std_within).abs() > 0.1,
            "std_within should differ: {} vs {}",
            a.std_within,
            b.std_within
        );
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn window_longer_than_series_is_insufficient_data() {
        let err = calculate_process(&[1.0, 2.0, 3.0], 0.0, 5.0, DEFAULT_WINDOW).unwrap_err();
        assert_eq!(
            err,
            SpcError::InsufficientData {
                required: 8,
                available: 3
            }
        );
    }

    #[test]
    fn window_below_two_is_rejected() {
        let data = [1.0, 2.0, 3.0];
        for window in [0, 1] {
            assert!(matches!(
                calculate_process(&data, 0.0, 5.0, window),
                Err(SpcError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn empty_and_non_finite_series_are_rejected() {
        assert!(matches!(
            calculate_process(&[], 0.0, 5.0, 2),
            Err(SpcError::InvalidArgument(_))
        ));
        assert!(matches!(
            calculate_process(&[1.0, f64::NAN, 2.0], 0.0, 5.0, 2),
            Err(SpcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn inverted_limits_are_computed_not_rejected() {
        let data = [4.0, 5.0, 6.0, 5.0, 4.5, 5.5];
        let s = calculate_process(&data, 10.0, 0.0, 2).unwrap();
        assert!(s.ppk < 0.0);
        assert!(s.cpk < 0.0);
    }

    // -----------------------------------------------------------------------
    // Analyzer
    // -----------------------------------------------------------------------

    #[test]
    fn default_analyzer_uses_window_eight() {
        let analyzer = ProcessAnalyzer::default();
        assert_eq!(analyzer.config().window, DEFAULT_WINDOW);
        assert!((analyzer.d2() - 2.847).abs() < 1e-2);
    }

    #[test]
    fn analyzer_matches_free_function() {
        let data = [
            10.1, 9.8, 10.4, 10.0, 9.7, 10.2, 10.3, 9.9, 10.0, 10.6, 9.6, 10.1,
        ];
        let analyzer = ProcessAnalyzer::default().with_window(5).unwrap();
        let a = analyzer.analyze(&data, 9.0, 11.0).unwrap();
        let b = calculate_process(&data, 9.0, 11.0, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn analyzer_rejects_bad_config() {
        assert!(ProcessAnalyzer::default().with_window(1).is_err());
        let bad_grid = AnalyzerConfig {
            window: 4,
            integration: D2Integration {
                lower: 0.0,
                upper: 0.0,
                points: 10,
            },
        };
        assert!(ProcessAnalyzer::new(bad_grid).is_err());
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    #[test]
    fn summary_serializes_keys_in_fixed_order() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let s = calculate_process(&data, 0.0, 9.0, 4).unwrap();
        let json = serde_json::to_string(&s).unwrap();

        let keys = [
            "\"sample size\"",
            "\"mean\"",
            "\"std\"",
            "\"std_within\"",
            "\"ppk\"",
            "\"cpk\"",
            "\"min\"",
            "\"max\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(k).unwrap_or_else(|| panic!("missing {k} in {json}")))
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "keys out of order: {json}"
        );
    }
}
