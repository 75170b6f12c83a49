//! Records of objects the painter placed on a tilemap.

use crate::core::types::{Quat, Vec3};
use crate::grid::Cell;
use crate::host::ObjectHandle;
use crate::palette::PaletteId;

/// What the painter remembers about one placed instance.
///
/// The instance itself belongs to the host scene; `cell` is only a lookup
/// key back to the cell it was stamped into.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObjectRecord {
    pub handle: ObjectHandle,
    pub position: Vec3,
    pub rotation: Quat,
    pub palette: PaletteId,
    pub layer: u32,
    pub cell: Option<Cell>,
}

/// Placed-object list of the tilemap being painted.
///
/// Records are appended by painting and removed by erasing or replacing;
/// they are never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Tilemap {
    name: String,
    records: Vec<PlacedObjectRecord>,
}

impl Tilemap {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), records: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[PlacedObjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: PlacedObjectRecord) {
        self.records.push(record);
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&PlacedObjectRecord> {
        self.records.iter().find(|r| r.handle == handle)
    }

    pub fn remove(&mut self, handle: ObjectHandle) -> Option<PlacedObjectRecord> {
        let index = self.records.iter().position(|r| r.handle == handle)?;
        Some(self.records.remove(index))
    }

    /// Drop records whose instance no longer exists. Returns how many went.
    pub fn prune(&mut self, exists: impl Fn(ObjectHandle) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|r| exists(r.handle));
        before - self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> PlacedObjectRecord {
        PlacedObjectRecord {
            handle: ObjectHandle(id),
            position: Vec3::splat(id as f32),
            rotation: Quat::IDENTITY,
            palette: PaletteId::new("a"),
            layer: 0,
            cell: None,
        }
    }

    #[test]
    fn test_push_remove_prune() {
        let mut map = Tilemap::new("Level");
        map.push(record(1));
        map.push(record(2));
        map.push(record(3));

        assert_eq!(map.remove(ObjectHandle(2)).map(|r| r.handle), Some(ObjectHandle(2)));
        assert!(map.remove(ObjectHandle(2)).is_none());

        assert_eq!(map.prune(|h| h != ObjectHandle(3)), 1);
        assert_eq!(map.len(), 1);
        assert!(map.get(ObjectHandle(1)).is_some());
    }
}
