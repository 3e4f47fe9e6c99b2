//! Errors for folder navigation and the image workspace.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::format::FormatError;
use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read folder {path:?}: {source}")]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No preview images found in {0:?}")]
    NoImages(PathBuf),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("No image is open")]
    NoSession,

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
