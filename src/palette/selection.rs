//! Current palette selection (single or multi).

use super::PaletteId;

/// Ordered set of selected palette entries. The first one is what single
/// painting stamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteSelection {
    ids: Vec<PaletteId>,
}

impl PaletteSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with one entry
    pub fn select_single(&mut self, id: PaletteId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Append an entry if it is not selected yet. Returns true if added.
    pub fn add(&mut self, id: PaletteId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: &PaletteId) {
        self.ids.retain(|i| i != id);
    }

    pub fn contains(&self, id: &PaletteId) -> bool {
        self.ids.contains(id)
    }

    /// Entry used for single painting
    pub fn primary(&self) -> Option<&PaletteId> {
        self.ids.first()
    }

    pub fn ids(&self) -> &[PaletteId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids for which `keep` returns false
    pub fn retain(&mut self, keep: impl FnMut(&PaletteId) -> bool) {
        self.ids.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_multi() {
        let mut sel = PaletteSelection::new();
        assert!(sel.primary().is_none());

        sel.select_single(PaletteId::new("a"));
        assert!(sel.add(PaletteId::new("b")));
        assert!(!sel.add(PaletteId::new("a")));
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.primary(), Some(&PaletteId::new("a")));

        sel.select_single(PaletteId::new("c"));
        assert_eq!(sel.ids(), &[PaletteId::new("c")]);
    }
}
