//! Application state: the open annotation session and the image folder around it.

mod error;
mod project;
mod session;
mod workspace;

pub use error::StateError;
pub use project::{ProjectState, is_preview_file};
pub use session::{AnnotationSession, Anchor, Command, CommandOutcome, LoadReport};
pub use workspace::{ImageHeaderProbe, PreviewProbe, Workspace};
