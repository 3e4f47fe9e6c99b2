//! Working through a folder of preview images one session at a time.
//!
//! Only one image is open at a time. Switching images flushes the current
//! session to its box file (best effort), discards it, then opens a fresh
//! session for the new image.

use std::path::Path;

use crate::config::Settings;
use crate::format::{FormatError, box_path_for};
use crate::model::{EraseBrush, ImageCalibration};
use crate::state::error::StateError;
use crate::state::project::ProjectState;
use crate::state::session::{AnnotationSession, Command, CommandOutcome, LoadReport};

/// Supplies the pixel size of a preview image.
pub trait PreviewProbe {
    fn preview_dimensions(&self, image: &Path) -> Result<(u32, u32), FormatError>;
}

/// Reads preview dimensions from the image file header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageHeaderProbe;

impl PreviewProbe for ImageHeaderProbe {
    fn preview_dimensions(&self, image: &Path) -> Result<(u32, u32), FormatError> {
        Ok(image::image_dimensions(image)?)
    }
}

/// A project folder plus the session of its current image.
pub struct Workspace<P: PreviewProbe = ImageHeaderProbe> {
    project: ProjectState,
    settings: Settings,
    probe: P,
    session: Option<AnnotationSession>,
}

impl<P: PreviewProbe> Workspace<P> {
    /// Create a workspace. No image is opened until [`open_current`](Self::open_current).
    pub fn new(project: ProjectState, settings: Settings, probe: P) -> Self {
        Self {
            project,
            settings,
            probe,
            session: None,
        }
    }

    pub fn project(&self) -> &ProjectState {
        &self.project
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Option<&AnnotationSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut AnnotationSession> {
        self.session.as_mut()
    }

    /// Flush any open session, then open the project's current image.
    pub fn open_current(&mut self) -> Result<LoadReport, StateError> {
        self.flush();

        let image = self
            .project
            .current_image()
            .cloned()
            .ok_or_else(|| StateError::NoImages(self.project.folder.clone()))?;
        let (width, height) = self.probe.preview_dimensions(&image)?;
        let calibration = self.settings.calibration(width, height)?;

        let (session, report) = AnnotationSession::open(
            calibration,
            box_path_for(&image),
            self.settings.default_box_size(),
        );
        log::info!(
            "Opened {:?} ({}x{} preview, {} particles) [{}]",
            image,
            width,
            height,
            report.particles,
            self.project.progress()
        );
        self.session = Some(session.with_brush(EraseBrush::new(self.settings.brush_size)));
        Ok(report)
    }

    pub fn next_image(&mut self) -> Result<LoadReport, StateError> {
        self.flush();
        self.project.next();
        self.open_current()
    }

    pub fn prev_image(&mut self) -> Result<LoadReport, StateError> {
        self.flush();
        self.project.prev();
        self.open_current()
    }

    /// Open the image with the given file name or base name.
    pub fn select_image(&mut self, name: &str) -> Result<LoadReport, StateError> {
        self.project.position_of(name).ok_or_else(|| StateError::ImageNotFound(name.to_string()))?;
        self.flush();
        self.project.select(name)?;
        self.open_current()
    }

    /// Apply a command to the open session.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, StateError> {
        let session = self.session.as_mut().ok_or(StateError::NoSession)?;
        Ok(session.apply(command)?)
    }

    /// Change the source raster size used for this and every later image.
    pub fn recalibrate(&mut self, source_width: u32, source_height: u32) -> Result<(), StateError> {
        if let Some(session) = self.session.as_mut() {
            session.recalibrate(i64::from(source_width), i64::from(source_height))?;
        } else {
            ImageCalibration::new(i64::from(source_width), i64::from(source_height), 1, 1)?;
        }
        self.settings.source_width = source_width;
        self.settings.source_height = source_height;
        Ok(())
    }

    pub fn toggle_mark(&mut self) -> bool {
        self.project.toggle_current_mark()
    }

    /// Append the marked images to the list at `path`, and save the open session.
    pub fn write_marked(&mut self, path: &Path) -> Result<Vec<String>, StateError> {
        let written = self.project.marked.append_to(path)?;
        if let Some(session) = self.session.as_mut() {
            session.save();
        }
        Ok(written)
    }

    /// Flush the open session and write the settings snapshot to `settings_path`.
    pub fn close(mut self, settings_path: &Path) -> Result<Settings, StateError> {
        self.flush();
        self.settings.last_image = self.project.current_base_name();
        self.settings.save_snapshot(settings_path)?;
        Ok(self.settings)
    }

    /// Save and drop the open session, carrying its box size and brush into the settings.
    fn flush(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.save();
            self.settings.box_size = session.box_size().get();
            self.settings.brush_size = session.brush().size();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PreviewPoint, SourceCoord, SourcePoint};
    use crate::state::session::Anchor;

    struct FixedProbe(u32, u32);

    impl PreviewProbe for FixedProbe {
        fn preview_dimensions(&self, _image: &Path) -> Result<(u32, u32), FormatError> {
            Ok((self.0, self.1))
        }
    }

    fn workspace(names: &[&str]) -> (tempfile::TempDir, Workspace<FixedProbe>) {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();
        let settings = Settings {
            source_width: 4096,
            source_height: 4096,
            ..Settings::default()
        };
        (dir, Workspace::new(project, settings, FixedProbe(1024, 1024)))
    }

    #[test]
    fn test_apply_without_session() {
        let (_dir, mut ws) = workspace(&["a.gif"]);
        assert!(matches!(
            ws.apply(Command::SaveStore),
            Err(StateError::NoSession)
        ));
    }

    #[test]
    fn test_switch_flushes_then_replaces() {
        let (dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        std::fs::write(dir.path().join("b.box"), "2048 2048 128 128\n").unwrap();

        ws.open_current().unwrap();
        ws.apply(Command::AddPoint {
            at: PreviewPoint::new(100, 1000),
            anchor: Anchor::Corner,
        })
        .unwrap();

        let report = ws.next_image().unwrap();
        assert_eq!(report.particles, 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.box")).unwrap(),
            "400     96    128    128\n"
        );
        let session = ws.session().unwrap();
        assert_eq!(
            session.store().get(PreviewPoint::new(512, 512)),
            Some(SourceCoord::Resolved(SourcePoint::new(2048, 2048)))
        );

        // back to a.gif: the flushed point comes back as ground truth
        ws.prev_image().unwrap();
        let session = ws.session().unwrap();
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.store().unresolved_count(), 0);
    }

    #[test]
    fn test_image_without_box_file_creates_none() {
        let (dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        ws.open_current().unwrap();
        ws.next_image().unwrap();
        assert!(!dir.path().join("a.box").exists());
    }

    #[test]
    fn test_box_size_and_brush_carry_over() {
        let (_dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        ws.open_current().unwrap();
        ws.apply(Command::ResizeBoxTo(200)).unwrap();
        ws.session_mut().unwrap().brush_mut().grow();

        ws.next_image().unwrap();
        let session = ws.session().unwrap();
        assert_eq!(session.box_size().get(), 200);
        assert_eq!(session.brush().size(), Settings::default().brush_size + 2);
    }

    #[test]
    fn test_select_unknown_image_keeps_session() {
        let (_dir, mut ws) = workspace(&["a.gif"]);
        ws.open_current().unwrap();
        assert!(matches!(
            ws.select_image("nope"),
            Err(StateError::ImageNotFound(_))
        ));
        assert!(ws.session().is_some());
    }

    #[test]
    fn test_recalibrate_updates_settings() {
        let (_dir, mut ws) = workspace(&["a.gif"]);
        ws.open_current().unwrap();
        ws.recalibrate(2048, 2048).unwrap();
        assert_eq!(ws.settings().source_width, 2048);
        assert_eq!(ws.session().unwrap().calibration().source_width(), 2048);
        assert!(ws.recalibrate(0, 2048).is_err());
        assert_eq!(ws.settings().source_width, 2048);
    }

    #[test]
    fn test_close_writes_settings() {
        let (dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        ws.select_image("b.gif").unwrap();
        let settings_path = dir.path().join("settings.txt");

        let settings = ws.close(&settings_path).unwrap();
        assert_eq!(settings.last_image.as_deref(), Some("b"));

        let reloaded = Settings::load_snapshot(&settings_path).unwrap();
        assert_eq!(reloaded.last_image.as_deref(), Some("b"));
        assert_eq!(reloaded.source_width, 4096);
    }

    #[test]
    fn test_write_marked() {
        let (dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        ws.open_current().unwrap();
        assert!(ws.toggle_mark());

        let list = dir.path().join("marked_imgs.txt");
        assert_eq!(ws.write_marked(&list).unwrap(), vec!["a.gif".to_string()]);
        assert!(ws.write_marked(&list).unwrap().is_empty());
    }

    #[test]
    fn test_mark_toggles_across_runs() {
        let (dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        let list = dir.path().join("marked_imgs.txt");
        ws.select_image("b").unwrap();
        assert!(ws.toggle_mark());
        ws.write_marked(&list).unwrap();
        ws.close(&dir.path().join("settings.txt")).unwrap();

        let project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();
        let mut ws = Workspace::new(project, Settings::default(), FixedProbe(1024, 1024));
        ws.select_image("b").unwrap();
        assert!(ws.project().is_current_marked());
        assert!(!ws.toggle_mark());
    }

    #[test]
    fn test_rejected_box_file_survives_switch_and_close() {
        let (dir, mut ws) = workspace(&["a.gif", "b.gif"]);
        let contents = "100 200 125 125\n300 400 125 125\n";
        std::fs::write(dir.path().join("a.box"), contents).unwrap();

        let report = ws.open_current().unwrap();
        assert!(report.warning.is_some());
        ws.next_image().unwrap();
        ws.prev_image().unwrap();
        ws.close(&dir.path().join("settings.txt")).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("a.box")).unwrap(), contents);
    }
}
