//! The particle box size shared by every annotation of an image.

use std::fmt;

use crate::model::error::ModelError;

/// Side length of a particle box in source pixels. Always positive and even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxSize(u32);

impl BoxSize {
    pub const DEFAULT: BoxSize = BoxSize(crate::constants::DEFAULT_BOX_SIZE);

    /// Validate a candidate box size.
    pub fn new(value: i64) -> Result<Self, ModelError> {
        match u32::try_from(value) {
            Ok(v) if v > 0 && v % 2 == 0 && v <= i32::MAX as u32 => Ok(Self(v)),
            _ => Err(ModelError::InvalidBoxSize { value }),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Physical box edge for a given pixel size in Ångström per pixel.
    pub fn angstroms(self, angpix: f64) -> f64 {
        f64::from(self.0) * angpix
    }
}

impl fmt::Display for BoxSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
