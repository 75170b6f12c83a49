//! Expanding an anchor and two brush corners into the selected cells.

use crate::core::types::Vec3;
use super::cell::Cell;
use super::frame::GridFrame;

/// Builds the ordered cell set covered by a brush stamp
pub struct SelectionAreaBuilder<'a> {
    grid: &'a GridFrame,
}

impl<'a> SelectionAreaBuilder<'a> {
    pub fn new(grid: &'a GridFrame) -> Self {
        Self { grid }
    }

    /// All cells in the box between `pos1` and `pos2` (inclusive), each then
    /// rotated about `anchor` around the up axis.
    ///
    /// Cells are ordered world X outermost, then Y, then Z. Enumeration happens
    /// before rotation, so off-lattice angles turn the box instead of
    /// re-snapping it. Non-finite corners give an empty selection.
    pub fn build(&self, anchor: Cell, pos1: Cell, pos2: Cell, rotation_degrees: f32) -> Vec<Cell> {
        if !anchor.is_finite() || !pos1.is_finite() || !pos2.is_finite() {
            return Vec::new();
        }

        let step = self.grid.world_cell_size();
        let min = pos1.position().min(pos2.position());
        let max = pos1.position().max(pos2.position());
        let counts = ((max - min) / step).round();
        let (nx, ny, nz) = (counts.x as usize + 1, counts.y as usize + 1, counts.z as usize + 1);

        let mut cells = Vec::with_capacity(nx * ny * nz);
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    let offset = Vec3::new(ix as f32, iy as f32, iz as f32) * step;
                    cells.push(Cell::new(min + offset));
                }
            }
        }

        if rotation_degrees != 0.0 {
            let pivot = anchor.position();
            for cell in &mut cells {
                *cell = Cell::new(self.grid.rotate_about_up(cell.position(), pivot, rotation_degrees));
            }
        }

        cells
    }

    /// Corners of the rotated selection box for drawing: bottom face
    /// counter-clockwise, then the top face in the same order.
    ///
    /// The box spans half a cell past the outer cell positions on both planar
    /// axes and one cell height above the highest cell.
    pub fn outline(&self, anchor: Cell, pos1: Cell, pos2: Cell, rotation_degrees: f32) -> Option<[Vec3; 8]> {
        if !anchor.is_finite() || !pos1.is_finite() || !pos2.is_finite() {
            return None;
        }

        let a = self.grid.to_local(pos1.position());
        let b = self.grid.to_local(pos2.position());
        let half = self.grid.cell_size() * 0.5;
        let lo = a.min(b) - Vec3::new(half.x, half.y, 0.0);
        let hi = a.max(b) + Vec3::new(half.x, half.y, self.grid.cell_height());

        let local = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ];

        let pivot = anchor.position();
        Some(local.map(|l| self.grid.rotate_about_up(self.grid.to_world(l), pivot, rotation_degrees)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::grid::AxisSwizzle;

    fn cell(x: f32, y: f32, z: f32) -> Cell {
        Cell::new(Vec3::new(x, y, z))
    }

    #[test]
    fn test_single_cell() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let c = cell(3.0, 0.0, 5.0);
        assert_eq!(builder.build(c, c, c, 0.0), vec![c]);
    }

    #[test]
    fn test_three_by_three_invariant_under_right_angles() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let center = cell(1.0, 0.0, 1.0);
        let p1 = cell(0.0, 0.0, 0.0);
        let p2 = cell(2.0, 0.0, 2.0);

        let base: HashSet<Cell> = builder.build(center, p1, p2, 0.0).into_iter().collect();
        assert_eq!(base.len(), 9);

        for angle in [90.0, 180.0, 270.0, -90.0, 360.0, -270.0] {
            let cells = builder.build(center, p1, p2, angle);
            assert_eq!(cells.len(), 9, "angle {}", angle);
            let rotated: HashSet<Cell> = cells.into_iter().collect();
            assert_eq!(rotated, base, "angle {}", angle);
        }
    }

    #[test]
    fn test_corner_order_does_not_matter() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let a = cell(0.0, 0.0, 0.0);
        let b = cell(-2.0, 1.0, 3.0);
        let forward = builder.build(a, a, b, 0.0);
        let backward = builder.build(a, b, a, 0.0);
        assert_eq!(forward.len(), 3 * 2 * 4);
        assert_eq!(forward, backward);
        assert_eq!(forward[0], cell(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_non_unit_cell_size_steps() {
        let grid = GridFrame::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0), AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let a = cell(1.0, 0.0, 1.0);
        let b = cell(5.0, 0.0, 3.0);
        let cells = builder.build(a, a, b, 0.0);
        assert_eq!(cells.len(), 3 * 2);
        assert!(cells.contains(&cell(3.0, 0.0, 3.0)));
    }

    #[test]
    fn test_off_lattice_rotation_turns_box() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let a = cell(0.0, 0.0, 0.0);
        let b = cell(2.0, 0.0, 0.0);
        let cells = builder.build(a, a, b, 45.0);
        assert_eq!(cells.len(), 3);
        let far = cells[2].position();
        let expected = 2.0 * std::f32::consts::FRAC_1_SQRT_2;
        assert!((far.x - expected).abs() < 1e-5);
        assert!((far.z + expected).abs() < 1e-5);
    }

    #[test]
    fn test_infinite_corner_is_empty() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let a = cell(0.0, 0.0, 0.0);
        let bad = cell(f32::INFINITY, 0.0, 0.0);
        assert!(builder.build(a, a, bad, 0.0).is_empty());
        assert!(builder.outline(a, a, bad, 0.0).is_none());
    }

    #[test]
    fn test_outline_single_cell() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let builder = SelectionAreaBuilder::new(&grid);
        let c = cell(0.5, 0.0, 0.5);
        let corners = builder.outline(c, c, c, 0.0).unwrap();
        assert_eq!(corners[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(corners[6], Vec3::new(1.0, 1.0, 1.0));
    }
}
