//! Error types for box file and image list I/O.

use thiserror::Error;

use crate::model::ModelError;

/// Errors that can occur while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A box file row that could not be parsed; the whole file is rejected
    #[error("Malformed box file at line {line}: {message}")]
    MalformedBoxFile {
        /// 1-based line number of the offending row
        line: usize,
        /// Description of what was wrong with the row
        message: String,
    },

    /// Preview image header could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Calibration or box size rejected by the model
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FormatError {
    /// Create a malformed box file error for a 1-based line number.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedBoxFile {
            line,
            message: message.into(),
        }
    }

    /// Whether this error came from the file system rather than the file contents.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
