//! # u-spc
//!
//! Statistical process control (SPC) metrics for quality data: the d2
//! range constant, process capability indices (Cpk, Ppk), and a conformance
//! score against a fitted normal model.
//!
//! This crate is domain-agnostic: it operates on raw `f64` slices and knows
//! nothing about where the measurements come from or how results are
//! reported.
//!
//! ## Modules
//!
//! - [`d2`] — Expected range of a standard normal subgroup, by numerical
//!   integration
//! - [`capability`] — Rolling moving ranges and capability indices (Cpk, Ppk)
//! - [`conformance`] — Mean two-sided tail probability under a normal model
//! - [`error`] — Error taxonomy shared by all computations
//!
//! ## Quick start
//!
//! ```
//! use u_spc::{calculate_p_value, calculate_process, DEFAULT_WINDOW};
//!
//! let data = [
//!     10.1, 9.8, 10.4, 10.0, 9.7, 10.2, 10.3, 9.9, 10.0, 10.6, 9.6, 10.1,
//! ];
//! let summary = calculate_process(&data, 9.0, 11.0, DEFAULT_WINDOW).unwrap();
//! assert!(summary.cpk > 0.0);
//!
//! let p = calculate_p_value(summary.mean, summary.std, &data).unwrap();
//! assert!(p > 0.0 && p <= 1.0);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Explicit failures**: invalid inputs return [`SpcError`] before any
//!   computation instead of surfacing as NaN
//! - **Stateless**: every call is independent; reusable objects
//!   ([`capability::ProcessAnalyzer`], [`d2::D2Table`]) are immutable
//! - **Research-backed**: algorithms reference the quality-control literature

pub mod capability;
pub mod conformance;
pub mod d2;
pub mod error;

pub use capability::{calculate_process, ProcessSummary, DEFAULT_WINDOW};
pub use conformance::calculate_p_value;
pub use d2::calculate_d2;
pub use error::{Result, SpcError};
