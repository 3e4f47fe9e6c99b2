//! Folder of preview images being worked through, and which of them are marked.

use std::path::{Path, PathBuf};

use crate::constants::PREVIEW_EXTENSIONS;
use crate::format::MARKED_LIST_FILENAME;
use crate::format::MarkedImages;
use crate::state::error::StateError;

/// Check if a path has a supported preview extension.
pub fn is_preview_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PREVIEW_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// State for a loaded project (folder with preview images).
#[derive(Clone, Debug)]
pub struct ProjectState {
    /// Path to the project folder
    pub folder: PathBuf,
    /// Preview images in the folder, sorted by name
    pub images: Vec<PathBuf>,
    /// Current image index
    pub current_index: usize,
    /// Images flagged by the operator
    pub marked: MarkedImages,
}

impl ProjectState {
    /// Discover preview images in a folder, non-recursively, and pick up the
    /// folder's marked list if there is one.
    pub fn from_folder(folder: PathBuf) -> Result<Self, StateError> {
        let mut images: Vec<PathBuf> = std::fs::read_dir(&folder)
            .map_err(|source| StateError::ReadFolder {
                path: folder.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_preview_file(path))
            .collect();

        if images.is_empty() {
            return Err(StateError::NoImages(folder));
        }

        // Sort by filename for consistent ordering
        images.sort();

        log::info!("Scanned folder {:?}: found {} images", folder, images.len());

        let mut marked = MarkedImages::new();
        let list = folder.join(MARKED_LIST_FILENAME);
        if list.exists() {
            if let Err(e) = marked.load(&list) {
                log::warn!("Could not read marked list {:?}: {}", list, e);
            }
        }

        Ok(Self {
            folder,
            images,
            current_index: 0,
            marked,
        })
    }

    /// Get the current image path.
    pub fn current_image(&self) -> Option<&PathBuf> {
        self.images.get(self.current_index)
    }

    /// File name of the current image, e.g. `mic_0001.gif`.
    pub fn current_name(&self) -> Option<String> {
        self.current_image()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from)
    }

    /// File name of the current image without its extension.
    pub fn current_base_name(&self) -> Option<String> {
        self.current_image()
            .and_then(|p| p.file_stem())
            .and_then(|n| n.to_str())
            .map(String::from)
    }

    /// Move to the next image, wrapping around.
    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.current_index = (self.current_index + 1) % self.images.len();
        }
    }

    /// Move to the previous image, wrapping around.
    pub fn prev(&mut self) {
        if !self.images.is_empty() {
            self.current_index = if self.current_index == 0 {
                self.images.len() - 1
            } else {
                self.current_index - 1
            };
        }
    }

    /// Index of the image whose file name or base name is `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.images.iter().position(|p| {
            p.file_name().and_then(|n| n.to_str()) == Some(name)
                || p.file_stem().and_then(|n| n.to_str()) == Some(name)
        })
    }

    /// Make the image named `name` current.
    pub fn select(&mut self, name: &str) -> Result<(), StateError> {
        let index = self
            .position_of(name)
            .ok_or_else(|| StateError::ImageNotFound(name.to_string()))?;
        self.current_index = index;
        Ok(())
    }

    /// Toggle the mark on the current image. Returns whether it is now marked.
    pub fn toggle_current_mark(&mut self) -> bool {
        match self.current_name() {
            Some(name) => {
                let marked = self.marked.toggle(&name);
                log::info!("{} image {}", if marked { "Marked" } else { "Unmarked" }, name);
                marked
            }
            None => false,
        }
    }

    pub fn is_current_marked(&self) -> bool {
        self.current_name()
            .is_some_and(|name| self.marked.is_marked(&name))
    }

    /// Get progress string like "3/15".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.images.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_from_folder_lists_only_gifs_sorted() {
        let dir = folder_with(&["b.gif", "a.GIF", "a.box", "notes.txt", "c.gif"]);
        let project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();

        let names: Vec<_> = project
            .images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.GIF", "b.gif", "c.gif"]);
    }

    #[test]
    fn test_from_folder_without_images() {
        let dir = folder_with(&["a.box"]);
        assert!(matches!(
            ProjectState::from_folder(dir.path().to_path_buf()),
            Err(StateError::NoImages(_))
        ));
    }

    #[test]
    fn test_navigation_wraps() {
        let dir = folder_with(&["a.gif", "b.gif", "c.gif"]);
        let mut project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();

        project.prev();
        assert_eq!(project.current_name().as_deref(), Some("c.gif"));
        project.next();
        assert_eq!(project.current_name().as_deref(), Some("a.gif"));
        assert_eq!(project.progress(), "1/3");
    }

    #[test]
    fn test_select_by_name_or_base_name() {
        let dir = folder_with(&["a.gif", "b.gif"]);
        let mut project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();

        project.select("b").unwrap();
        assert_eq!(project.current_base_name().as_deref(), Some("b"));
        project.select("a.gif").unwrap();
        assert_eq!(project.current_index, 0);
        assert!(matches!(
            project.select("zzz.gif"),
            Err(StateError::ImageNotFound(_))
        ));
    }

    #[test]
    fn test_toggle_current_mark() {
        let dir = folder_with(&["a.gif"]);
        let mut project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();

        assert!(project.toggle_current_mark());
        assert!(project.is_current_marked());
        assert!(!project.toggle_current_mark());
        assert!(!project.is_current_marked());
    }

    #[test]
    fn test_from_folder_loads_marked_list() {
        let dir = folder_with(&["a.gif", "b.gif"]);
        std::fs::write(dir.path().join("marked_imgs.txt"), "# marked\nb.gif\n\n").unwrap();
        let mut project = ProjectState::from_folder(dir.path().to_path_buf()).unwrap();

        assert_eq!(project.marked.len(), 1);
        assert!(!project.is_current_marked());
        project.next();
        assert!(project.is_current_marked());
        assert!(!project.toggle_current_mark());
    }
}
