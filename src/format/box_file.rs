//! EMAN-style `.box` particle coordinate files.
//!
//! One particle per line: `x y width height`, whitespace separated, where
//! `(x, y)` is the bottom-left corner of the box on the source raster. Width
//! and height are always equal to the image's box size. Numbers may be written
//! as decimals on input; they are truncated toward zero.

use std::path::{Path, PathBuf};

use crate::format::error::FormatError;
use crate::model::{AnnotationStore, BoxSize, ImageCalibration, SourcePoint};

/// Extension of box files sitting next to their preview images.
pub const BOX_EXTENSION: &str = "box";

/// Path of the box file belonging to an image (`<base name>.box` in the same folder).
pub fn box_path_for(image: &Path) -> PathBuf {
    image.with_extension(BOX_EXTENSION)
}

/// One parsed box file row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRow {
    pub corner: SourcePoint,
    pub size: i64,
}

/// A decoded box file: resolved annotations plus the box size found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBoxFile {
    pub store: AnnotationStore,
    /// `None` when the file had no rows.
    pub box_size: Option<BoxSize>,
}

/// What a save actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file was (over)written with this many rows.
    Written { rows: usize },
    /// Nothing to save and no existing file to truncate.
    Skipped,
}

/// Reader and writer for box files.
pub struct BoxFileCodec;

impl BoxFileCodec {
    /// Parse box file text into resolved annotations keyed by their preview position.
    ///
    /// Any malformed row rejects the whole file. Blank lines are ignored. When
    /// two rows map to the same preview key the later row wins.
    pub fn decode(text: &str, calibration: &ImageCalibration) -> Result<DecodedBoxFile, FormatError> {
        let mut store = AnnotationStore::new();
        let mut box_size = None;

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = parse_row(line, idx + 1)?;
            let size = BoxSize::new(row.size).map_err(|e| FormatError::malformed(idx + 1, e.to_string()))?;

            if let Some(prev) = box_size {
                if prev != size {
                    log::warn!(
                        "Box file line {}: box size {} differs from earlier rows ({}), using the last one",
                        idx + 1,
                        size,
                        prev
                    );
                }
            }
            box_size = Some(size);
            store.insert_resolved(calibration.to_preview(row.corner), row.corner);
        }

        Ok(DecodedBoxFile { store, box_size })
    }

    /// Render a store as box file text.
    ///
    /// Resolved coordinates are written verbatim; unresolved ones are converted
    /// with the inverse transform here, without changing the store.
    pub fn encode(store: &AnnotationStore, calibration: &ImageCalibration, box_size: BoxSize) -> String {
        store
            .resolved_source_coordinates(calibration)
            .into_iter()
            .map(|p| format_row(p, box_size))
            .collect()
    }

    /// Read and decode a box file.
    pub fn read(path: &Path, calibration: &ImageCalibration) -> Result<DecodedBoxFile, FormatError> {
        let text = std::fs::read_to_string(path)?;
        let decoded = Self::decode(&text, calibration)?;
        log::info!(
            "Loaded {} particle(s) from {:?} (box size {})",
            decoded.store.len(),
            path,
            decoded
                .box_size
                .map_or_else(|| "unset".to_string(), |s| s.to_string())
        );
        Ok(decoded)
    }

    /// Write a store to `path`, replacing any previous contents.
    ///
    /// An empty store does not create a new file, but does truncate an
    /// existing one so that erasing every particle persists.
    pub fn write(
        path: &Path,
        store: &AnnotationStore,
        calibration: &ImageCalibration,
        box_size: BoxSize,
    ) -> Result<SaveOutcome, FormatError> {
        if store.is_empty() && !path.exists() {
            log::debug!("No particles to save and no existing file at {:?}", path);
            return Ok(SaveOutcome::Skipped);
        }

        std::fs::write(path, Self::encode(store, calibration, box_size))?;
        log::info!("Saved {} particle(s) to {:?}", store.len(), path);
        Ok(SaveOutcome::Written { rows: store.len() })
    }
}

/// Parse one non-blank row. `line_no` is 1-based and only used for errors.
pub fn parse_row(line: &str, line_no: usize) -> Result<BoxRow, FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(FormatError::malformed(
            line_no,
            format!("expected at least 3 columns, found {}", tokens.len()),
        ));
    }

    let x = parse_number(tokens[0], line_no)?;
    let y = parse_number(tokens[1], line_no)?;
    let size = parse_number(tokens[2], line_no)?;

    let coord = |v: i64| {
        i32::try_from(v).map_err(|_| FormatError::malformed(line_no, format!("coordinate {} out of range", v)))
    };

    Ok(BoxRow {
        corner: SourcePoint::new(coord(x)?, coord(y)?),
        size,
    })
}

/// Parse an integer or decimal token, truncating toward zero.
fn parse_number(token: &str, line_no: usize) -> Result<i64, FormatError> {
    if let Ok(v) = token.parse::<i64>() {
        return Ok(v);
    }
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() < 9.0e15 => Ok(v.trunc() as i64),
        _ => Err(FormatError::malformed(
            line_no,
            format!("'{}' is not a number", token),
        )),
    }
}

fn format_row(p: SourcePoint, box_size: BoxSize) -> String {
    format!("{}     {}    {}    {}\n", p.x, p.y, box_size, box_size)
}
