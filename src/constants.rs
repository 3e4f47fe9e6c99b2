//! Global constants for partbox

/// Source raster width and height assumed until the operator enters real ones
pub const DEFAULT_SOURCE_SIZE: u32 = 500;

/// Box size (source pixels) used for images without a box file
pub const DEFAULT_BOX_SIZE: u32 = 128;

/// Initial erase brush side length (preview pixels)
pub const DEFAULT_BRUSH_SIZE: u32 = 20;

/// Ångström per source pixel
pub const DEFAULT_ANGPIX: f64 = 1.0;

/// Settings snapshot written on exit in the working folder
pub const SETTINGS_FILENAME: &str = "partbox_settings.txt";

/// Preview image extensions picked up when scanning a folder
pub const PREVIEW_EXTENSIONS: &[&str] = &["gif"];
