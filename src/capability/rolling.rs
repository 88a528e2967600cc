//! Rolling moving ranges over a sample series.

use statrs::statistics::Statistics;

/// Range (max - min) of every contiguous window of `window` samples.
///
/// The window slides one position at a time, so a series of length `len`
/// yields `len - window + 1` ranges. Positions without a complete window are
/// skipped; an empty vector is returned when `window` is 0 or exceeds the
/// series length.
///
/// # Examples
///
/// ```
/// use u_spc::capability::moving_ranges;
///
/// let ranges = moving_ranges(&[1.0, 4.0, 2.0, 8.0], 2);
/// assert_eq!(ranges, vec![3.0, 2.0, 6.0]);
///
/// assert!(moving_ranges(&[1.0, 2.0], 3).is_empty());
/// ```
pub fn moving_ranges(samples: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    samples.windows(window).map(subgroup_range).collect()
}

/// Range of a single non-empty subgroup.
fn subgroup_range(subgroup: &[f64]) -> f64 {
    Statistics::max(subgroup) - Statistics::min(subgroup)
}
