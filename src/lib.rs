//! partbox - particle box editor
//!
//! Marks particle positions on a downsampled preview of a micrograph and
//! keeps them in an EMAN-style `.box` file in the coordinate space of the
//! full-resolution source, without drifting across load/edit/save cycles.

pub mod config;
pub mod constants;
pub mod format;
pub mod model;
pub mod state;

pub use config::{LogLevel, Settings};
pub use format::{BoxFileCodec, FormatError};
pub use model::{AnnotationStore, BoxSize, ImageCalibration, ModelError, PreviewPoint, SourcePoint};
pub use state::{AnnotationSession, Command, CommandOutcome, Workspace};
