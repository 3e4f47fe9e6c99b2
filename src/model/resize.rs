//! Box size changes that keep every particle's box centre in place.
//!
//! Box file coordinates name the bottom-left corner of the box in source
//! space. Growing the box by `delta` therefore moves the corner by `delta / 2`
//! down and to the left so that the centre stays on the particle. Both sizes
//! are validated even, so `delta / 2` is always exact.

use crate::model::box_size::BoxSize;
use crate::model::calibration::{ImageCalibration, SourcePoint};
use crate::model::error::ModelError;
use crate::model::store::AnnotationStore;

/// Result of remapping a store to a new box size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapped {
    pub store: AnnotationStore,
    pub box_size: BoxSize,
    /// Side of the new box on the preview raster.
    pub preview_box: i32,
    /// Annotations lost because two remapped boxes landed on the same preview key.
    pub collisions: usize,
}

/// Remap every annotation of `store` from box size `old` to `new`.
///
/// Unresolved annotations are resolved first. Every annotation of the result is
/// resolved and re-keyed by `to_preview` of its shifted source corner; when two
/// annotations land on the same key the later one wins. `store` itself is not
/// touched, so a rejected size leaves the caller's state as it was.
pub fn remap(
    store: &AnnotationStore,
    calibration: &ImageCalibration,
    old: BoxSize,
    new: i64,
) -> Result<Remapped, ModelError> {
    let new = BoxSize::new(new)?;
    let offset = (i64::from(new.get()) - i64::from(old.get())) / 2;
    let offset = i32::try_from(offset).map_err(|_| ModelError::InvalidBoxSize {
        value: i64::from(new.get()),
    })?;

    let mut remapped = AnnotationStore::new();
    for annotation in store.iter() {
        let source = annotation.source.resolve(annotation.preview, calibration);
        let shifted = SourcePoint::new(source.x.saturating_sub(offset), source.y.saturating_sub(offset));
        remapped.insert_resolved(calibration.to_preview(shifted), shifted);
    }

    let collisions = store.len() - remapped.len();
    if collisions > 0 {
        log::warn!(
            "Box resize {} -> {} merged {} annotation(s) onto shared preview keys",
            old,
            new,
            collisions
        );
    }

    Ok(Remapped {
        store: remapped,
        box_size: new,
        preview_box: calibration.preview_box_size(new.get()),
        collisions,
    })
}
