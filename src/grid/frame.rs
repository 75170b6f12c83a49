//! Grid frame: origin, cell size and axis swizzle.

use serde::{Deserialize, Serialize};
use crate::core::types::{Quat, Vec3};
use crate::math::Aabb;
use super::cell::Cell;
use super::swizzle::AxisSwizzle;

/// Where inside a cell the brush tile snaps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushAnchor {
    /// Middle of the cell on both planar axes
    #[default]
    Center,
    /// Lower planar corner of the cell
    Corner,
}

/// An oriented 3D grid.
///
/// `cell_size` is in logical order: width along X, depth along Y, height
/// along Z (up). The swizzle is fixed for the lifetime of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    origin: Vec3,
    cell_size: Vec3,
    swizzle: AxisSwizzle,
}

impl GridFrame {
    /// Create a grid frame.
    ///
    /// # Panics
    /// If any cell size component is not a positive finite number.
    pub fn new(origin: Vec3, cell_size: Vec3, swizzle: AxisSwizzle) -> Self {
        assert!(
            cell_size.is_finite() && cell_size.cmpgt(Vec3::ZERO).all(),
            "grid cell size must be positive, got {cell_size}"
        );
        Self { origin, cell_size, swizzle }
    }

    /// Unit cells at the world origin
    pub fn unit(swizzle: AxisSwizzle) -> Self {
        Self::new(Vec3::ZERO, Vec3::ONE, swizzle)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn swizzle(&self) -> AxisSwizzle {
        self.swizzle
    }

    /// Cell size in logical order
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Cell size laid out along world axes
    pub fn world_cell_size(&self) -> Vec3 {
        self.swizzle.to_world(self.cell_size)
    }

    /// Height of one cell along the up axis
    pub fn cell_height(&self) -> f32 {
        self.cell_size.z
    }

    pub fn up_index(&self) -> usize {
        self.swizzle.up_index()
    }

    pub fn up_vector(&self) -> Vec3 {
        self.swizzle.up_vector()
    }

    /// World up-coordinate of the grid origin
    pub fn base_height(&self) -> f32 {
        self.origin[self.up_index()]
    }

    /// World point -> logical coordinates relative to the origin
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.swizzle.to_logical(world - self.origin)
    }

    /// Logical coordinates relative to the origin -> world point
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.origin + self.swizzle.to_world(local)
    }

    /// Snap the planar (X, Y) part of a local position down to the cell lattice,
    /// then apply the anchor. The Z component is passed through.
    pub fn snap_planar(&self, local: Vec3, anchor: BrushAnchor) -> Vec3 {
        let cs = self.cell_size;
        let mut x = (local.x / cs.x).floor() * cs.x;
        let mut y = (local.y / cs.y).floor() * cs.y;
        if anchor == BrushAnchor::Center {
            x += cs.x * 0.5;
            y += cs.y * 0.5;
        }
        Vec3::new(x, y, local.z)
    }

    /// Box of one cell centred on `cell`, scaled by `scale` (1.0 = exact cell)
    pub fn cell_bounds(&self, cell: Cell, scale: f32) -> Aabb {
        Aabb::from_center_size(cell.position(), self.world_cell_size() * scale)
    }

    /// Rotate `point` about `pivot` around the up axis.
    ///
    /// Multiples of 90 degrees use exact sine/cosine so lattice points stay on
    /// the lattice bit-for-bit.
    pub fn rotate_about_up(&self, point: Vec3, pivot: Vec3, degrees: f32) -> Vec3 {
        let (s, c) = exact_sin_cos(degrees);
        let v = point - pivot;
        let r = match self.up_index() {
            0 => Vec3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z),
            1 => Vec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z),
            _ => Vec3::new(c * v.x - s * v.y, s * v.x + c * v.y, v.z),
        };
        pivot + r
    }

    /// Orientation for an object turned `degrees` around the up axis
    pub fn up_rotation(&self, degrees: f32) -> Quat {
        Quat::from_axis_angle(self.up_vector(), degrees.to_radians())
    }
}

impl Default for GridFrame {
    fn default() -> Self {
        Self::unit(AxisSwizzle::default())
    }
}

/// True when `degrees` is a whole multiple of 90
pub fn is_right_angle(degrees: f32) -> bool {
    degrees % 90.0 == 0.0
}

fn exact_sin_cos(degrees: f32) -> (f32, f32) {
    if is_right_angle(degrees) {
        match (degrees / 90.0).rem_euclid(4.0) as i32 {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        }
    } else {
        degrees.to_radians().sin_cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn test_rejects_non_positive_cell_size() {
        GridFrame::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), AxisSwizzle::Xzy);
    }

    #[test]
    fn test_world_cell_size_follows_swizzle() {
        let grid = GridFrame::new(Vec3::ZERO, Vec3::new(2.0, 3.0, 0.5), AxisSwizzle::Xzy);
        // logical Z (height) lands on world Y
        assert_eq!(grid.world_cell_size(), Vec3::new(2.0, 0.5, 3.0));
        assert_eq!(grid.cell_height(), 0.5);
    }

    #[test]
    fn test_snap_planar_center_and_corner() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let local = Vec3::new(3.7, -0.2, 9.0);
        assert_eq!(grid.snap_planar(local, BrushAnchor::Corner), Vec3::new(3.0, -1.0, 9.0));
        assert_eq!(grid.snap_planar(local, BrushAnchor::Center), Vec3::new(3.5, -0.5, 9.0));
    }

    #[test]
    fn test_rotate_right_angle_is_exact() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let rotated = grid.rotate_about_up(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 90.0);
        assert_eq!(Cell::new(rotated), Cell::new(Vec3::new(0.0, 0.0, -2.0)));

        let back = grid.rotate_about_up(rotated, Vec3::ZERO, -90.0);
        assert_eq!(Cell::new(back), Cell::new(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotate_matches_quaternion() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let p = Vec3::new(1.0, 0.0, 2.0);
        let by_grid = grid.rotate_about_up(p, Vec3::ZERO, 30.0);
        let by_quat = grid.up_rotation(30.0) * p;
        assert!(by_grid.abs_diff_eq(by_quat, 1e-5));
    }

    #[test]
    fn test_local_world_round_trip() {
        let grid = GridFrame::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE, AxisSwizzle::Zyx);
        let p = Vec3::new(-4.0, 0.5, 8.0);
        assert!(grid.to_world(grid.to_local(p)).abs_diff_eq(p, 1e-6));
    }
}
