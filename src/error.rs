//! Error type shared by all SPC computations.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpcError>;

/// Conditions rejected before any computation starts.
///
/// Invalid inputs are reported here instead of surfacing later as NaN or
/// infinite values. Zero variation in otherwise valid data is *not* an error;
/// see [`crate::capability::ProcessSummary`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpcError {
    /// An argument is outside its domain (empty series, non-finite value,
    /// subgroup size below 1 or 2, non-positive standard deviation, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The series is too short to form a single complete rolling window.
    #[error("insufficient data: need at least {required} samples, got {available}")]
    InsufficientData { required: usize, available: usize },
}

impl SpcError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Rejects empty series and series containing NaN or infinity.
pub(crate) fn ensure_finite_samples(samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        return Err(SpcError::invalid("sample series is empty"));
    }
    if let Some(pos) = samples.iter().position(|v| !v.is_finite()) {
        return Err(SpcError::invalid(format!(
            "sample at index {pos} is not finite ({})",
            samples[pos]
        )));
    }
    Ok(())
}
