//! Bucketing placed objects into the cells of a selection.

use std::collections::{HashMap, HashSet};

use crate::grid::{Cell, GridFrame, is_right_angle};
use crate::host::LayerMask;
use crate::math::Aabb;
use super::record::PlacedObjectRecord;

/// Scale of the per-cell box on the rotated path, so neighbours never share
/// an object
pub const ROTATED_CELL_SCALE: f32 = 0.99;

/// Occupants of every considered cell, in selection order
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    cells: Vec<Cell>,
    occupants: HashMap<Cell, Vec<PlacedObjectRecord>>,
}

impl Occupancy {
    /// Cells in selection order (already-visited cells left out)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn occupants_at(&self, cell: Cell) -> &[PlacedObjectRecord] {
        self.occupants.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty_at(&self, cell: Cell) -> bool {
        self.occupants_at(cell).is_empty()
    }

    /// Cells paired with their occupants
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &[PlacedObjectRecord])> + '_ {
        self.cells.iter().map(move |&c| (c, self.occupants_at(c)))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn push_cell(&mut self, cell: Cell) {
        if self.occupants.insert(cell, Vec::new()).is_none() {
            self.cells.push(cell);
        }
    }
}

/// Answers "what occupies this cell" for a selection
pub struct OccupancyIndex<'a> {
    grid: &'a GridFrame,
    layer_mask: LayerMask,
}

impl<'a> OccupancyIndex<'a> {
    pub fn new(grid: &'a GridFrame, layer_mask: LayerMask) -> Self {
        Self { grid, layer_mask }
    }

    /// Map each cell of `cells` to the records positioned inside it.
    ///
    /// Cells in `visited` are skipped. Right-angle rotations gather candidates
    /// once with the bounds of the whole selection and then hand each one to
    /// its nearest containing cell; other rotations test every record against
    /// a slightly shrunk box per cell.
    pub fn classify(
        &self,
        cells: &[Cell],
        records: &[PlacedObjectRecord],
        visited: &HashSet<Cell>,
        rotation_degrees: f32,
    ) -> Occupancy {
        let mut occupancy = Occupancy::default();
        for &cell in cells {
            if !visited.contains(&cell) {
                occupancy.push_cell(cell);
            }
        }
        if occupancy.cells.is_empty() {
            return occupancy;
        }

        let records = records.iter().filter(|r| self.layer_mask.contains(r.layer));
        if is_right_angle(rotation_degrees) {
            self.classify_aligned(&mut occupancy, records);
        } else {
            self.classify_rotated(&mut occupancy, records);
        }
        occupancy
    }

    fn classify_aligned<'r>(&self, occupancy: &mut Occupancy, records: impl Iterator<Item = &'r PlacedObjectRecord>) {
        let Some(area) = occupancy
            .cells
            .iter()
            .map(|&c| self.grid.cell_bounds(c, 1.0))
            .reduce(|a, b| a.merged(&b))
        else {
            return;
        };

        for record in records.filter(|r| area.contains_point(r.position)) {
            let nearest = occupancy
                .cells
                .iter()
                .filter(|&&c| self.grid.cell_bounds(c, 1.0).contains_point(record.position))
                .min_by(|a, b| {
                    let da = a.position().distance_squared(record.position);
                    let db = b.position().distance_squared(record.position);
                    da.total_cmp(&db)
                })
                .copied();

            if let Some(list) = nearest.and_then(|cell| occupancy.occupants.get_mut(&cell)) {
                list.push(record.clone());
            }
        }
    }

    fn classify_rotated<'r>(&self, occupancy: &mut Occupancy, records: impl Iterator<Item = &'r PlacedObjectRecord>) {
        let records: Vec<&PlacedObjectRecord> = records.collect();
        for cell in occupancy.cells.clone() {
            let bounds: Aabb = self.grid.cell_bounds(cell, ROTATED_CELL_SCALE);
            if let Some(list) = occupancy.occupants.get_mut(&cell) {
                list.extend(records.iter().filter(|r| bounds.contains_point(r.position)).map(|r| (*r).clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Quat, Vec3};
    use crate::grid::{AxisSwizzle, SelectionAreaBuilder};
    use crate::host::ObjectHandle;
    use crate::palette::PaletteId;

    fn record(id: u64, position: Vec3, layer: u32) -> PlacedObjectRecord {
        PlacedObjectRecord {
            handle: ObjectHandle(id),
            position,
            rotation: Quat::IDENTITY,
            palette: PaletteId::new("p"),
            layer,
            cell: None,
        }
    }

    fn area(grid: &GridFrame, rotation: f32) -> Vec<Cell> {
        let anchor = Cell::new(Vec3::new(1.5, 0.0, 1.5));
        let far = Cell::new(Vec3::new(3.5, 0.0, 3.5));
        let near = Cell::new(Vec3::new(-0.5, 0.0, -0.5));
        SelectionAreaBuilder::new(grid).build(anchor, near, far, rotation)
    }

    #[test]
    fn test_no_records_gives_empty_cells() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let cells = area(&grid, 0.0);
        let occ = OccupancyIndex::new(&grid, LayerMask::ALL).classify(&cells, &[], &HashSet::new(), 0.0);
        assert_eq!(occ.len(), cells.len());
        assert!(occ.iter().all(|(_, list)| list.is_empty()));
    }

    #[test]
    fn test_aligned_assigns_to_own_cell() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let cells = area(&grid, 0.0);
        let records = vec![
            record(1, Vec3::new(1.5, 0.0, 1.5), 0),
            record(2, Vec3::new(2.6, 0.0, 0.4), 0),
            record(3, Vec3::new(20.0, 0.0, 0.0), 0),
        ];
        let occ = OccupancyIndex::new(&grid, LayerMask::ALL).classify(&cells, &records, &HashSet::new(), 90.0);

        let at = |x: f32, z: f32| occ.occupants_at(Cell::new(Vec3::new(x, 0.0, z)));
        assert_eq!(at(1.5, 1.5).len(), 1);
        assert_eq!(at(2.5, 0.5)[0].handle, ObjectHandle(2));
        let total: usize = occ.iter().map(|(_, l)| l.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_rotated_path_and_layer_filter() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let cells = area(&grid, 45.0);
        let records = vec![record(1, Vec3::new(1.5, 0.0, 1.5), 2), record(2, Vec3::new(1.5, 0.0, 1.5), 4)];

        let occ = OccupancyIndex::new(&grid, LayerMask::from_layers(&[2])).classify(&cells, &records, &HashSet::new(), 45.0);
        let anchor = Cell::new(Vec3::new(1.5, 0.0, 1.5));
        let list = occ.occupants_at(anchor);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].handle, ObjectHandle(1));
    }

    #[test]
    fn test_visited_cells_skipped() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let cells = area(&grid, 0.0);
        let mut visited = HashSet::new();
        visited.insert(cells[0]);
        let occ = OccupancyIndex::new(&grid, LayerMask::ALL).classify(&cells, &[], &visited, 0.0);
        assert_eq!(occ.len(), cells.len() - 1);
        assert!(!occ.cells().contains(&cells[0]));
    }
}
