//! The set of annotations belonging to one image.

use indexmap::IndexMap;

use crate::model::annotation::{Annotation, BoxBounds, SourceCoord};
use crate::model::calibration::{ImageCalibration, PreviewPoint, SourcePoint};

/// What a toggle-style add ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new unresolved annotation was inserted at this key.
    Added(PreviewPoint),
    /// The click landed on an existing box, which was removed instead.
    Removed(PreviewPoint),
}

/// Annotations of one image keyed by their preview coordinate.
///
/// Insertion order is preserved so that a store decoded from a box file
/// writes its rows back in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStore {
    entries: IndexMap<PreviewPoint, SourceCoord>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, preview: PreviewPoint) -> Option<SourceCoord> {
        self.entries.get(&preview).copied()
    }

    pub fn contains(&self, preview: PreviewPoint) -> bool {
        self.entries.contains_key(&preview)
    }

    pub fn iter(&self) -> impl Iterator<Item = Annotation> + '_ {
        self.entries.iter().map(|(&preview, &source)| Annotation { preview, source })
    }

    /// Number of annotations still waiting for a source coordinate.
    pub fn unresolved_count(&self) -> usize {
        self.entries.values().filter(|c| !c.is_resolved()).count()
    }

    /// Toggle at `point`: remove the first box containing it, or add an unresolved box anchored there.
    pub fn add(&mut self, point: PreviewPoint, preview_box: i32) -> AddOutcome {
        self.toggle(point, point, preview_box)
    }

    /// Toggle with a hit test at `hit` and, when nothing is hit, a new box anchored at `anchor`.
    ///
    /// Only the first box containing `hit` is removed; heavily overlapping
    /// boxes take one call each.
    pub fn toggle(&mut self, hit: PreviewPoint, anchor: PreviewPoint, preview_box: i32) -> AddOutcome {
        if let Some(existing) = self.hit_test(hit, preview_box) {
            self.entries.shift_remove(&existing);
            return AddOutcome::Removed(existing);
        }
        self.entries.insert(anchor, SourceCoord::Unresolved);
        AddOutcome::Added(anchor)
    }

    /// Key of the first box (in insertion order) whose bounds contain `point`.
    pub fn hit_test(&self, point: PreviewPoint, preview_box: i32) -> Option<PreviewPoint> {
        self.entries
            .keys()
            .copied()
            .find(|&anchor| BoxBounds::from_anchor(anchor, preview_box).contains(point))
    }

    /// Delete the annotation keyed by exactly `preview`. Returns whether one existed.
    pub fn remove(&mut self, preview: PreviewPoint) -> bool {
        self.entries.shift_remove(&preview).is_some()
    }

    /// Delete every listed key; keys that are absent are ignored.
    pub fn remove_all(&mut self, keys: &[PreviewPoint]) -> usize {
        keys.iter().filter(|&&key| self.remove(key)).count()
    }

    /// Insert ground truth under `preview`, overwriting any annotation already keyed there.
    pub fn insert_resolved(&mut self, preview: PreviewPoint, source: SourcePoint) {
        self.entries.insert(preview, SourceCoord::Resolved(source));
    }

    /// Insert a point placed on the preview, overwriting any annotation already keyed there.
    pub fn insert_unresolved(&mut self, preview: PreviewPoint) {
        self.entries.insert(preview, SourceCoord::Unresolved);
    }

    /// Source coordinate of every annotation in order, converting unresolved ones on the fly.
    ///
    /// The store itself is left untouched: unresolved entries stay unresolved.
    pub fn resolved_source_coordinates(&self, calibration: &ImageCalibration) -> Vec<SourcePoint> {
        self.entries
            .iter()
            .map(|(&preview, source)| source.resolve(preview, calibration))
            .collect()
    }

    /// Discard every annotation and install `other` in one step.
    pub fn replace(&mut self, other: AnnotationStore) {
        self.entries = other.entries;
    }
}

impl FromIterator<(PreviewPoint, SourcePoint)> for AnnotationStore {
    fn from_iter<I: IntoIterator<Item = (PreviewPoint, SourcePoint)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (preview, source) in iter {
            store.insert_resolved(preview, source);
        }
        store
    }
}
