//! Annotation types: a preview-space key paired with its source-space coordinate.

use crate::model::calibration::{ImageCalibration, PreviewPoint, SourcePoint};

/// Source-space coordinate of an annotation.
///
/// A `Resolved` value is ground truth (read from a box file or produced by a
/// resize) and is never re-derived from the preview key. An `Unresolved` value
/// marks a point placed on the preview; it is converted only when a source
/// coordinate is actually needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCoord {
    Resolved(SourcePoint),
    Unresolved,
}

impl SourceCoord {
    /// The source coordinate for this annotation, converting from `preview` if unresolved.
    pub fn resolve(self, preview: PreviewPoint, calibration: &ImageCalibration) -> SourcePoint {
        match self {
            SourceCoord::Resolved(point) => point,
            SourceCoord::Unresolved => calibration.to_source(preview),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SourceCoord::Resolved(_))
    }
}

/// A single annotation as seen when iterating a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    /// Bottom-left corner of the box on the preview raster (unique key).
    pub preview: PreviewPoint,
    pub source: SourceCoord,
}

/// Closed rectangle occupied by a box on the preview raster.
///
/// The anchor is the bottom-left corner; preview `y` grows downward so the box
/// extends upward from the anchor: `x..=x+size`, `y-size..=y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxBounds {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl BoxBounds {
    pub fn from_anchor(anchor: PreviewPoint, preview_box: i32) -> Self {
        Self {
            x_min: anchor.x,
            x_max: anchor.x.saturating_add(preview_box),
            y_min: anchor.y.saturating_sub(preview_box),
            y_max: anchor.y,
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: PreviewPoint) -> bool {
        (self.x_min..=self.x_max).contains(&point.x) && (self.y_min..=self.y_max).contains(&point.y)
    }
}
