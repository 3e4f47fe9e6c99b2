//! The annotation session for the image currently open.
//!
//! A session owns everything the editing commands touch: the image
//! calibration, the shared box size, the annotation store, the erase brush and
//! the path of the box file the store is persisted to. Every command runs to
//! completion before returning; erase and resize compute their full result
//! before the store is changed.

use std::path::{Path, PathBuf};

use crate::format::{BoxFileCodec, FormatError, SaveOutcome};
use crate::model::{
    AddOutcome, AnnotationStore, BoxSize, EraseBrush, ImageCalibration, ModelError, PreviewPoint,
    SourceCoord, resize,
};

/// Where a new box goes relative to the point that was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The clicked point is the box's bottom-left corner.
    #[default]
    Corner,
    /// The box is centred on the clicked point.
    Centered,
}

/// A discrete operator action delivered by the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Toggle a particle at a preview position.
    AddPoint { at: PreviewPoint, anchor: Anchor },
    /// Apply the erase brush centred on a preview position.
    EraseAt(PreviewPoint),
    /// Change the box size of every particle.
    ResizeBoxTo(i64),
    /// Write the store to its box file (best effort).
    SaveStore,
    /// Replace the store with the contents of its box file.
    LoadStore,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Toggled(AddOutcome),
    Erased(Vec<PreviewPoint>),
    Resized { box_size: BoxSize, collisions: usize },
    /// `None` when the save failed; the failure has already been logged.
    Saved(Option<SaveOutcome>),
    Loaded(LoadReport),
}

/// Summary of loading a box file into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub particles: usize,
    pub box_size: BoxSize,
    /// Set when the file existed but could not be used; the store is then empty.
    pub warning: Option<String>,
}

/// Annotation state for one open image.
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    calibration: ImageCalibration,
    box_size: BoxSize,
    store: AnnotationStore,
    brush: EraseBrush,
    box_path: Option<PathBuf>,
    /// The box file exists but was rejected on load. It is left alone until
    /// there is something to write in its place.
    file_rejected: bool,
}

impl AnnotationSession {
    /// A session with no backing file.
    pub fn new(calibration: ImageCalibration, box_size: BoxSize) -> Self {
        Self {
            calibration,
            box_size,
            store: AnnotationStore::new(),
            brush: EraseBrush::default(),
            box_path: None,
            file_rejected: false,
        }
    }

    /// Open a session backed by `box_path`, loading it if it exists.
    ///
    /// `default_box_size` applies until a box file provides one.
    pub fn open(
        calibration: ImageCalibration,
        box_path: impl Into<PathBuf>,
        default_box_size: BoxSize,
    ) -> (Self, LoadReport) {
        let mut session = Self::new(calibration, default_box_size);
        session.box_path = Some(box_path.into());
        let report = session.load();
        (session, report)
    }

    pub fn with_brush(mut self, brush: EraseBrush) -> Self {
        self.brush = brush;
        self
    }

    pub fn calibration(&self) -> &ImageCalibration {
        &self.calibration
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }

    /// Box side on the preview raster.
    pub fn preview_box(&self) -> i32 {
        self.calibration.preview_box_size(self.box_size.get())
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn brush(&self) -> &EraseBrush {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut EraseBrush {
        &mut self.brush
    }

    pub fn box_path(&self) -> Option<&Path> {
        self.box_path.as_deref()
    }

    /// Run one command to completion.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, ModelError> {
        log::debug!("Applying {:?}", command);
        let outcome = match command {
            Command::AddPoint { at, anchor } => CommandOutcome::Toggled(self.add_point(at, anchor)),
            Command::EraseAt(center) => CommandOutcome::Erased(self.erase_at(center)),
            Command::ResizeBoxTo(size) => {
                let collisions = self.resize_box_to(size)?;
                CommandOutcome::Resized {
                    box_size: self.box_size,
                    collisions,
                }
            }
            Command::SaveStore => CommandOutcome::Saved(self.save()),
            Command::LoadStore => CommandOutcome::Loaded(self.load()),
        };
        Ok(outcome)
    }

    /// Toggle a particle at `at`: remove the box under it, or add a new unresolved one.
    pub fn add_point(&mut self, at: PreviewPoint, anchor: Anchor) -> AddOutcome {
        let preview_box = self.preview_box();
        let corner = match anchor {
            Anchor::Corner => at,
            Anchor::Centered => {
                let half = preview_box / 2;
                PreviewPoint::new(at.x.saturating_sub(half), at.y.saturating_add(half))
            }
        };
        self.store.toggle(at, corner, preview_box)
    }

    /// Remove every particle the brush touches when centred on `center`.
    pub fn erase_at(&mut self, center: PreviewPoint) -> Vec<PreviewPoint> {
        let preview_box = self.preview_box();
        let removed = self.brush.rect_at(center).erase(&mut self.store, preview_box);
        if !removed.is_empty() {
            log::debug!("Erased {} particle(s) at {:?}", removed.len(), center);
        }
        removed
    }

    /// Change the box size, keeping every box centred on its particle, then save.
    ///
    /// Returns how many particles were merged away by key collisions. On error
    /// nothing changes.
    pub fn resize_box_to(&mut self, new_size: i64) -> Result<usize, ModelError> {
        let remapped = resize::remap(&self.store, &self.calibration, self.box_size, new_size)?;
        log::info!(
            "Resized boxes {} -> {} ({} particles)",
            self.box_size,
            remapped.box_size,
            remapped.store.len()
        );
        self.store.replace(remapped.store);
        self.box_size = remapped.box_size;
        self.save();
        Ok(remapped.collisions)
    }

    /// Switch to a new source raster size for the same preview.
    ///
    /// Resolved particles keep their source coordinates and get new preview
    /// keys; unresolved ones keep their preview position.
    pub fn recalibrate(&mut self, source_width: i64, source_height: i64) -> Result<(), ModelError> {
        let calibration = ImageCalibration::new(
            source_width,
            source_height,
            i64::from(self.calibration.preview_width()),
            i64::from(self.calibration.preview_height()),
        )?;

        let mut rekeyed = AnnotationStore::new();
        for annotation in self.store.iter() {
            match annotation.source {
                SourceCoord::Resolved(source) => {
                    rekeyed.insert_resolved(calibration.to_preview(source), source);
                }
                SourceCoord::Unresolved => rekeyed.insert_unresolved(annotation.preview),
            }
        }
        self.store.replace(rekeyed);
        self.calibration = calibration;
        log::info!(
            "Recalibrated to source {}x{}",
            calibration.source_width(),
            calibration.source_height()
        );
        Ok(())
    }

    /// Write the store to the box file, propagating failures.
    ///
    /// A box file that was rejected on load is never truncated: while the
    /// store is empty the save is skipped.
    pub fn try_save(&mut self) -> Result<SaveOutcome, FormatError> {
        let Some(path) = &self.box_path else {
            log::debug!("Session has no box file; nothing saved");
            return Ok(SaveOutcome::Skipped);
        };
        if self.file_rejected && self.store.is_empty() {
            log::warn!("Leaving rejected box file {:?} untouched", path);
            return Ok(SaveOutcome::Skipped);
        }

        let outcome = BoxFileCodec::write(path, &self.store, &self.calibration, self.box_size)?;
        if let SaveOutcome::Written { .. } = outcome {
            self.file_rejected = false;
        }
        Ok(outcome)
    }

    /// Write the store to the box file. Failures are logged and swallowed so
    /// that editing can continue.
    pub fn save(&mut self) -> Option<SaveOutcome> {
        match self.try_save() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                log::error!("Failed to save box file {:?}: {}", self.box_path, e);
                None
            }
        }
    }

    /// Replace the store with the contents of the box file.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// also yields an empty store, with a warning in the report, and is kept
    /// on disk as it is.
    pub fn load(&mut self) -> LoadReport {
        let mut warning = None;
        let decoded = match &self.box_path {
            Some(path) if path.exists() => match BoxFileCodec::read(path, &self.calibration) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    log::warn!("Could not load {:?}, starting empty: {}", path, e);
                    warning = Some(e.to_string());
                    None
                }
            },
            _ => None,
        };

        self.file_rejected = warning.is_some();
        match decoded {
            Some(decoded) => {
                if let Some(size) = decoded.box_size {
                    self.box_size = size;
                }
                self.store.replace(decoded.store);
            }
            None => self.store.replace(AnnotationStore::new()),
        }

        LoadReport {
            particles: self.store.len(),
            box_size: self.box_size,
            warning,
        }
    }
}
