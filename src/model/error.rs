//! Validation errors for the coordinate model.

use thiserror::Error;

/// Errors raised by calibration, transform and box size validation.
///
/// These are deterministic input errors; retrying the same call fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Source or preview dimensions that cannot define a scale factor
    #[error(
        "Invalid calibration: source {source_width}x{source_height}, preview {preview_width}x{preview_height}"
    )]
    InvalidCalibration {
        /// Source raster width in pixels
        source_width: i64,
        /// Source raster height in pixels
        source_height: i64,
        /// Preview raster width in pixels
        preview_width: i64,
        /// Preview raster height in pixels
        preview_height: i64,
    },

    /// Box size that is not a positive even integer
    #[error("Invalid box size {value}: must be a positive even integer")]
    InvalidBoxSize {
        /// The rejected value
        value: i64,
    },
}
