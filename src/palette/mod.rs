//! Palette of placeable definitions.
//!
//! The painter only reads entries and reacts to refreshes; how a source finds
//! its definitions is up to the source.

pub mod directory;
pub mod selection;

use serde::{Deserialize, Serialize};
use crate::core::types::Result;

pub use directory::DirectoryPalette;
pub use selection::PaletteSelection;

/// Stable identity of a placeable definition (its asset path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteId(pub String);

impl PaletteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One selectable definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub id: PaletteId,
    /// Folder / group the entry was found in
    pub group: String,
    /// Display name
    pub name: String,
}

impl PaletteEntry {
    pub fn new(id: impl Into<String>, group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PaletteId::new(id),
            group: group.into(),
            name: name.into(),
        }
    }
}

/// Supplies palette entries to the editor
pub trait PaletteSource {
    /// Entries in source order, optionally limited to one group
    fn list_entries(&self, group: Option<&str>) -> Vec<PaletteEntry>;

    /// Group names in source order
    fn folders(&self) -> Vec<String>;

    /// Re-scan the backing store. Must be idempotent.
    fn refresh(&mut self) -> Result<()>;
}

/// Fixed in-memory palette
#[derive(Debug, Clone, Default)]
pub struct StaticPalette {
    entries: Vec<PaletteEntry>,
}

impl StaticPalette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: PaletteEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }
}

impl PaletteSource for StaticPalette {
    fn list_entries(&self, group: Option<&str>) -> Vec<PaletteEntry> {
        filter_group(&self.entries, group)
    }

    fn folders(&self) -> Vec<String> {
        unique_groups(&self.entries)
    }

    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn filter_group(entries: &[PaletteEntry], group: Option<&str>) -> Vec<PaletteEntry> {
    entries
        .iter()
        .filter(|e| group.is_none_or(|g| e.group == g))
        .cloned()
        .collect()
}

pub(crate) fn unique_groups(entries: &[PaletteEntry]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for entry in entries {
        if !groups.contains(&entry.group) {
            groups.push(entry.group.clone());
        }
    }
    groups
}
