//! Mask error types

use thiserror::Error;
use veil_animation::EasingError;
use veil_paint::SurfaceError;

/// Errors raised by the mask engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    /// A gesture completed but no percent callback was registered
    #[error("No percent callback registered to receive the erased percentage")]
    MissingCallback,

    /// Grid dimensions or spacing are unusable
    #[error("Invalid checkpoint grid: {width}x{height} with step {step}")]
    InvalidGrid { width: f32, height: f32, step: f32 },

    /// Fill color could not be parsed
    #[error("Invalid mask color: {0}")]
    InvalidColor(String),

    /// An easing curve named in the config is unknown
    #[error(transparent)]
    Easing(#[from] EasingError),

    /// Surface operation failed
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Result type for mask operations
pub type Result<T> = std::result::Result<T, MaskError>;
