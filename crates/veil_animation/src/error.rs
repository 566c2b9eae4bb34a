//! Animation error types

use thiserror::Error;

/// Errors raised while building or looking up easing curves
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EasingError {
    /// No curve registered under this name
    #[error("Unknown easing curve: {0}")]
    UnknownCurve(String),

    /// Control points must come in (x, y) pairs
    #[error("Bezier control coordinates must come in pairs, got {0} values")]
    OddControlPoints(usize),

    /// A control coordinate was NaN or infinite
    #[error("Bezier control coordinate is not finite: {0}")]
    NonFiniteControlPoint(f64),
}

/// Result type for easing operations
pub type Result<T> = std::result::Result<T, EasingError>;
