//! Error types returned by the render pipeline and report producers.

use thiserror::Error;

/// Rejected render parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A smoothing or LoG sigma was zero, negative or not finite.
    #[error("{name} must be positive and finite, found {value}")]
    InvalidSigma {
        /// Parameter that held the sigma.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The threshold was outside `[0, 255]`.
    #[error("threshold must be finite and within [0, 255], found {0}")]
    InvalidThreshold(f64),
    /// A spectrum was requested on an empty grid.
    #[error("spectrum size must be positive")]
    InvalidSpectrumSize,
}

/// Failure to produce a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The producer could not be reached or declined the request.
    #[error("report producer is unavailable: {0}")]
    Unavailable(String),
    /// Writing the report text failed.
    #[error("failed to format report")]
    Format(#[from] std::fmt::Error),
}
