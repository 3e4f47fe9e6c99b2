//! Coordinate model: calibration, annotations, erase brush and box resizing.

mod annotation;
mod box_size;
mod brush;
mod calibration;
mod error;
pub mod resize;
mod store;

pub use annotation::{Annotation, BoxBounds, SourceCoord};
pub use box_size::BoxSize;
pub use brush::{BRUSH_STEP, BrushRect, EraseBrush, ranges_intersect};
pub use calibration::{ImageCalibration, PreviewPoint, SourcePoint};
pub use error::ModelError;
pub use resize::Remapped;
pub use store::{AddOutcome, AnnotationStore};
