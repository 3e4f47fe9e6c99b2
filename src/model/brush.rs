//! Erase brush: a square region in preview space that deletes every box it touches.

use crate::model::annotation::BoxBounds;
use crate::model::calibration::PreviewPoint;
use crate::model::store::AnnotationStore;

/// Amount the brush side changes per grow/shrink action.
pub const BRUSH_STEP: u32 = 2;

/// Whether two closed, low-to-high ordered ranges `[a0, a1]` and `[b0, b1]` overlap.
///
/// Touching endpoints count as overlapping.
pub fn ranges_intersect(a0: i32, a1: i32, b0: i32, b1: i32) -> bool {
    a0 <= b1 && b0 <= a1
}

/// Closed brush rectangle on the preview raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushRect {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl BrushRect {
    /// Whether the brush catches a box with the given bounds.
    pub fn catches(&self, bounds: &BoxBounds) -> bool {
        ranges_intersect(bounds.x_min, bounds.x_max, self.x_min, self.x_max)
            && ranges_intersect(bounds.y_min, bounds.y_max, self.y_min, self.y_max)
    }

    /// Keys of every annotation in `store` whose box this brush catches.
    pub fn caught(&self, store: &AnnotationStore, preview_box: i32) -> Vec<PreviewPoint> {
        store
            .iter()
            .map(|a| a.preview)
            .filter(|&anchor| self.catches(&BoxBounds::from_anchor(anchor, preview_box)))
            .collect()
    }

    /// Remove every caught annotation in one batch. Returns the removed keys.
    pub fn erase(&self, store: &mut AnnotationStore, preview_box: i32) -> Vec<PreviewPoint> {
        let caught = self.caught(store, preview_box);
        store.remove_all(&caught);
        caught
    }
}

/// The operator's erase brush. Only its side length is stateful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseBrush {
    size: u32,
}

impl EraseBrush {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn grow(&mut self) {
        self.size = self.size.saturating_add(BRUSH_STEP);
    }

    /// Shrink by one step, stopping at zero.
    pub fn shrink(&mut self) {
        self.size = self.size.saturating_sub(BRUSH_STEP);
    }

    /// Apply a signed number of grow (positive) or shrink (negative) steps, as from a scroll wheel.
    pub fn adjust(&mut self, steps: i32) {
        for _ in 0..steps.unsigned_abs() {
            if steps > 0 {
                self.grow();
            } else {
                self.shrink();
            }
        }
    }

    /// Brush rectangle centred on `center`, spanning `size / 2` pixels each way.
    pub fn rect_at(&self, center: PreviewPoint) -> BrushRect {
        let half = i32::try_from(self.size / 2).unwrap_or(i32::MAX);
        BrushRect {
            x_min: center.x.saturating_sub(half),
            x_max: center.x.saturating_add(half),
            y_min: center.y.saturating_sub(half),
            y_max: center.y.saturating_add(half),
        }
    }
}

impl Default for EraseBrush {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_BRUSH_SIZE)
    }
}
