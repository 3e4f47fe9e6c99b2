//! The marked-image list: plain text, one image file name per line.
//!
//! Writing merges with whatever is already on disk by appending missing names;
//! existing lines are never rewritten or removed.

use std::io::Write;
use std::path::Path;

use crate::format::error::FormatError;

/// Default file name of the marked-image list in the working folder.
pub const MARKED_LIST_FILENAME: &str = "marked_imgs.txt";

/// Ordered set of image names flagged by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedImages {
    names: Vec<String>,
}

impl MarkedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_marked(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Mark `name` if unmarked, unmark it otherwise. Returns whether it is now marked.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
            false
        } else {
            self.names.push(name.to_string());
            true
        }
    }

    /// Add the names listed in `text`, skipping comments, blanks and duplicates.
    ///
    /// Only the first whitespace-separated column of each line is used.
    /// Returns how many new names were added.
    pub fn merge_text(&mut self, text: &str) -> usize {
        let mut added = 0;
        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let Some(name) = line.split_whitespace().next() else {
                continue;
            };
            if !self.is_marked(name) {
                self.names.push(name.to_string());
                added += 1;
            }
        }
        added
    }

    /// Merge a list file from disk into this set.
    pub fn load(&mut self, path: &Path) -> Result<usize, FormatError> {
        let text = std::fs::read_to_string(path)?;
        let added = self.merge_text(&text);
        log::info!("Loaded {} new marked image(s) from {:?}", added, path);
        Ok(added)
    }

    /// Append every name not already present in the file at `path`, creating it if needed.
    ///
    /// Returns the names that were written.
    pub fn append_to(&self, path: &Path) -> Result<Vec<String>, FormatError> {
        let existing: Vec<String> = if path.exists() {
            std::fs::read_to_string(path)?
                .lines()
                .map(|l| l.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|n| !existing.contains(*n))
            .cloned()
            .collect();

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        for name in &missing {
            writeln!(file, "{}", name)?;
            log::debug!("Entry written to {:?}: {}", path, name);
        }
        log::info!(
            "Marked list {:?}: {} written, {} already present",
            path,
            missing.len(),
            self.names.len() - missing.len()
        );
        Ok(missing)
    }
}
