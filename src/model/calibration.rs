//! Image calibration and the source <-> preview coordinate transform.
//!
//! The source raster is the full-resolution micrograph the box file refers to;
//! the preview raster is the downsampled GIF the operator clicks on. The scale
//! factor `preview_width / source_width` is assumed to hold for both axes.
//!
//! The vertical axis is inverted between the two spaces: source `y` grows
//! upward from the bottom edge, preview `y` grows downward from the top edge.
//!
//! All conversions are carried out in exact integer arithmetic on the rational
//! scale factor, so `floor` is the mathematical floor rather than the floor of
//! a rounded float product.

use crate::model::error::ModelError;

/// A pixel position on the preview raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewPoint {
    pub x: i32,
    pub y: i32,
}

impl PreviewPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A pixel position on the source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourcePoint {
    pub x: i32,
    pub y: i32,
}

impl SourcePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the source raster and of the preview derived from it.
///
/// Fixed for the lifetime of one loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCalibration {
    source_width: u32,
    source_height: u32,
    preview_width: u32,
    preview_height: u32,
}

impl ImageCalibration {
    /// Create a calibration, rejecting zero, negative or oversized dimensions.
    pub fn new(
        source_width: i64,
        source_height: i64,
        preview_width: i64,
        preview_height: i64,
    ) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidCalibration {
            source_width,
            source_height,
            preview_width,
            preview_height,
        };
        let dim = |v: i64| u32::try_from(v).ok().filter(|&d| d > 0 && d <= i32::MAX as u32);

        Ok(Self {
            source_width: dim(source_width).ok_or_else(invalid)?,
            source_height: dim(source_height).ok_or_else(invalid)?,
            preview_width: dim(preview_width).ok_or_else(invalid)?,
            preview_height: dim(preview_height).ok_or_else(invalid)?,
        })
    }

    pub fn source_width(&self) -> u32 {
        self.source_width
    }

    pub fn source_height(&self) -> u32 {
        self.source_height
    }

    pub fn preview_width(&self) -> u32 {
        self.preview_width
    }

    pub fn preview_height(&self) -> u32 {
        self.preview_height
    }

    /// How much smaller the preview is than the source (`preview_width / source_width`).
    pub fn scale_factor(&self) -> f64 {
        f64::from(self.preview_width) / f64::from(self.source_width)
    }

    /// Map a source coordinate onto the preview raster.
    ///
    /// `x' = floor(x * s)`, `y' = floor(preview_height - y * s)`.
    pub fn to_preview(&self, point: SourcePoint) -> PreviewPoint {
        let sw = i64::from(self.source_width);
        let pw = i64::from(self.preview_width);
        let ph = i64::from(self.preview_height);

        let x = (i64::from(point.x) * pw).div_euclid(sw);
        let y = (ph * sw - i64::from(point.y) * pw).div_euclid(sw);
        PreviewPoint::new(saturate(x), saturate(y))
    }

    /// Map a preview coordinate back onto the source raster.
    ///
    /// `x = floor(x' / s)`, `y = floor(source_height - y' / s)`. Not an exact
    /// inverse of [`to_preview`](Self::to_preview): both directions truncate.
    pub fn to_source(&self, point: PreviewPoint) -> SourcePoint {
        let sw = i64::from(self.source_width);
        let sh = i64::from(self.source_height);
        let pw = i64::from(self.preview_width);

        let x = (i64::from(point.x) * sw).div_euclid(pw);
        let y = (sh * pw - i64::from(point.y) * sw).div_euclid(pw);
        SourcePoint::new(saturate(x), saturate(y))
    }

    /// Side of a source-space box once drawn on the preview, rounded to the nearest pixel.
    pub fn preview_box_size(&self, source_box: u32) -> i32 {
        let sw = i64::from(self.source_width);
        let pw = i64::from(self.preview_width);
        saturate((2 * i64::from(source_box) * pw + sw).div_euclid(2 * sw))
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter() -> ImageCalibration {
        ImageCalibration::new(4096, 4096, 1024, 1024).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(matches!(
            ImageCalibration::new(0, 4096, 1024, 1024),
            Err(ModelError::InvalidCalibration { source_width: 0, .. })
        ));
        assert!(ImageCalibration::new(4096, -1, 1024, 1024).is_err());
        assert!(ImageCalibration::new(4096, 4096, 0, 1024).is_err());
        assert!(ImageCalibration::new(4096, 4096, 1024, i64::MAX).is_err());
    }

    #[test]
    fn test_scale_factor() {
        assert!((quarter().scale_factor() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_preview_inverts_y() {
        let cal = quarter();
        assert_eq!(
            cal.to_preview(SourcePoint::new(2048, 2048)),
            PreviewPoint::new(512, 512)
        );
        assert_eq!(cal.to_preview(SourcePoint::new(0, 0)), PreviewPoint::new(0, 1024));
        assert_eq!(cal.to_preview(SourcePoint::new(0, 4096)), PreviewPoint::new(0, 0));
    }

    #[test]
    fn test_to_preview_floors() {
        let cal = quarter();
        // 2051 * 0.25 = 512.75, 1024 - 512.75 = 511.25
        assert_eq!(
            cal.to_preview(SourcePoint::new(2051, 2051)),
            PreviewPoint::new(512, 511)
        );
        // negative source coordinates floor away from zero
        assert_eq!(cal.to_preview(SourcePoint::new(-1, 0)).x, -1);
    }

    #[test]
    fn test_to_source() {
        let cal = quarter();
        assert_eq!(
            cal.to_source(PreviewPoint::new(512, 512)),
            SourcePoint::new(2048, 2048)
        );
        assert_eq!(cal.to_source(PreviewPoint::new(0, 1024)), SourcePoint::new(0, 0));
    }

    #[test]
    fn test_exact_for_non_dyadic_scale() {
        // 70 * 0.3 is 20.999999999999996 in f64
        let cal = ImageCalibration::new(1000, 1000, 300, 300).unwrap();
        assert_eq!(cal.to_preview(SourcePoint::new(70, 1000)).x, 21);
    }

    #[test]
    fn test_source_round_trip_within_one_preview_pixel() {
        for (sw, sh, pw, ph) in [(4096, 4096, 1024, 1024), (3838, 3710, 512, 495), (500, 500, 500, 500)] {
            let cal = ImageCalibration::new(sw, sh, pw, ph).unwrap();
            let tolerance = (f64::from(cal.source_width()) / f64::from(cal.preview_width())).ceil() as i32;
            for x in (0..sw as i32).step_by(37) {
                for y in (0..sh as i32).step_by(41) {
                    let src = SourcePoint::new(x, y);
                    let back = cal.to_source(cal.to_preview(src));
                    assert!((back.x - src.x).abs() <= tolerance, "x {:?} -> {:?}", src, back);
                    assert!((back.y - src.y).abs() <= tolerance, "y {:?} -> {:?}", src, back);
                }
            }
        }
    }

    #[test]
    fn test_preview_round_trip_within_one_pixel() {
        let cal = ImageCalibration::new(3838, 3710, 512, 495).unwrap();
        for x in 0..512 {
            for y in (0..495).step_by(7) {
                let p = PreviewPoint::new(x, y);
                let back = cal.to_preview(cal.to_source(p));
                assert!((back.x - p.x).abs() <= 1);
                assert!((back.y - p.y).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_preview_box_size_rounds() {
        let cal = quarter();
        assert_eq!(cal.preview_box_size(128), 32);
        assert_eq!(cal.preview_box_size(130), 33); // 32.5 rounds up
        assert_eq!(cal.preview_box_size(129), 32); // 32.25
    }
}
