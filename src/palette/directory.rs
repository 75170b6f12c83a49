//! Palette backed by a folder of asset files.
//!
//! Layout is `<root>/<group>/<name>.<ext>`: each immediate sub-folder of the
//! root is one group. Files directly in the root are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::Error;
use crate::core::types::Result;
use super::{PaletteEntry, PaletteSource, filter_group, unique_groups};

/// Extensions picked up when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["prefab", "fbx"];

/// Scans a folder tree for placeable definitions
#[derive(Debug, Clone)]
pub struct DirectoryPalette {
    root: PathBuf,
    extensions: Vec<String>,
    entries: Vec<PaletteEntry>,
}

impl DirectoryPalette {
    /// Create an unscanned palette; call `refresh` to populate it
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            entries: Vec::new(),
        }
    }

    /// Replace the accepted file extensions (without the dot, case-insensitive)
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_ascii_lowercase()).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }

    fn scan(&self) -> Result<Vec<PaletteEntry>> {
        let mut groups: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        groups.sort();

        let mut entries = Vec::new();
        for group_dir in groups {
            let Some(group) = group_dir.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };

            let mut files: Vec<PathBuf> = fs::read_dir(&group_dir)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && self.accepts(p))
                .collect();
            files.sort();

            for file in files {
                let name = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let id = file.to_string_lossy().replace('\\', "/");
                entries.push(PaletteEntry::new(id, group.clone(), name));
            }
        }

        Ok(entries)
    }
}

impl PaletteSource for DirectoryPalette {
    fn list_entries(&self, group: Option<&str>) -> Vec<PaletteEntry> {
        filter_group(&self.entries, group)
    }

    fn folders(&self) -> Vec<String> {
        unique_groups(&self.entries)
    }

    fn refresh(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            self.entries.clear();
            return Err(Error::Palette(format!(
                "palette folder {} does not exist",
                self.root.display()
            )));
        }

        self.entries = self.scan()?;
        log::debug!("Palette {} refreshed: {} entries", self.root.display(), self.entries.len());
        Ok(())
    }
}
