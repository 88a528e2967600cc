//! Process capability analysis.
//!
//! Computes capability indices for assessing how well a process meets its
//! specification limits.
//!
//! # Indices
//!
//! - **Ppk** — Long-term performance, overall sample standard deviation
//! - **Cpk** — Short-term capability, within-subgroup sigma from rolling
//!   ranges (R-bar / d2)
//!
//! # Moving ranges
//!
//! - [`moving_ranges`] — Range of every contiguous subgroup of a series
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod indices;
mod rolling;

pub use indices::{
    calculate_process, AnalyzerConfig, ProcessAnalyzer, ProcessSummary, DEFAULT_WINDOW,
};
pub use rolling::moving_ranges;
