//! Active tool and brush parameters.

use serde::{Deserialize, Serialize};
use crate::core::types::{IVec3, UVec3, Vec3};
use crate::grid::{BrushAnchor, Cell, GridFrame, SurfacePick};

/// Interactive tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    None,
    Paint,
    Eraser,
    Dropper,
    /// Two-corner drag that sets the brush extent
    BrushSizing,
}

impl Tool {
    /// Which cell to pick when the pointer lands on existing geometry
    pub fn surface_pick(self) -> SurfacePick {
        match self {
            Tool::Paint => SurfacePick::Above,
            _ => SurfacePick::At,
        }
    }

    /// Tools that act on the scene and show a selection
    pub fn is_active(self) -> bool {
        self != Tool::None
    }

    /// Tools from which a sizing drag can start
    pub fn can_size(self) -> bool {
        matches!(self, Tool::Paint | Tool::Eraser)
    }
}

/// Signed brush size in cells per logical axis.
///
/// The sign gives the direction the box grows from the anchor cell. A
/// component is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushExtent(IVec3);

impl BrushExtent {
    pub const ONE: BrushExtent = BrushExtent(IVec3::ONE);

    /// Zero components become 1
    pub fn new(counts: IVec3) -> Self {
        Self(IVec3::new(non_zero(counts.x), non_zero(counts.y), non_zero(counts.z)))
    }

    pub fn counts(self) -> IVec3 {
        self.0
    }

    /// Number of cells covered
    pub fn cell_count(self) -> usize {
        let a = self.0.abs();
        (a.x * a.y * a.z) as usize
    }

    /// Extent spanning two corner cells (inclusive)
    pub fn from_corners(grid: &GridFrame, pos1: Cell, pos2: Cell) -> Self {
        let d = ((grid.to_local(pos2.position()) - grid.to_local(pos1.position())) / grid.cell_size()).round();
        let d = d.as_ivec3();
        let grow = |v: i32| if v >= 0 { v + 1 } else { v - 1 };
        Self(IVec3::new(grow(d.x), grow(d.y), grow(d.z)))
    }

    /// Each axis limited to `limits` cells, keeping its direction
    pub fn clamped(self, limits: BrushLimits) -> Self {
        let max = limits.0.max(UVec3::ONE).min(UVec3::splat(i32::MAX as u32)).as_ivec3();
        Self::new(self.0.clamp(-max, max))
    }

    /// Opposite corner of the box that starts at `anchor`
    pub fn far_corner(self, grid: &GridFrame, anchor: Cell) -> Cell {
        let steps = self.0 - self.0.signum();
        let local = grid.to_local(anchor.position()) + steps.as_vec3() * grid.cell_size();
        Cell::new(grid.to_world(local))
    }
}

impl Default for BrushExtent {
    fn default() -> Self {
        Self::ONE
    }
}

fn non_zero(v: i32) -> i32 {
    if v == 0 { 1 } else { v }
}

/// Maximum brush size per logical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushLimits(pub UVec3);

impl BrushLimits {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self(UVec3::new(x.max(1), y.max(1), z.max(1)))
    }
}

impl Default for BrushLimits {
    fn default() -> Self {
        Self(UVec3::splat(10))
    }
}

/// Brush parameters shared by every tool.
///
/// The tool and extent are session state; the rest is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushState {
    #[serde(skip)]
    pub tool: Tool,
    /// Degrees around the grid up axis, kept in [-360, 360)
    #[serde(rename = "brush_rotation")]
    pub rotation: f32,
    /// Degrees added by the rotate key
    pub rotation_step: f32,
    /// World offset added to every placed instance
    #[serde(rename = "brush_offset")]
    pub offset: Vec3,
    #[serde(rename = "brush_anchor")]
    pub anchor: BrushAnchor,
    #[serde(skip)]
    pub extent: BrushExtent,
}

pub const DEFAULT_ROTATION_STEP: f32 = 45.0;

impl Default for BrushState {
    fn default() -> Self {
        Self {
            tool: Tool::None,
            rotation: 0.0,
            rotation_step: DEFAULT_ROTATION_STEP,
            offset: Vec3::ZERO,
            anchor: BrushAnchor::Center,
            extent: BrushExtent::ONE,
        }
    }
}

impl BrushState {
    /// Turn by `rotation_step` (itself limited to one full turn either way)
    pub fn rotate_step(&mut self) {
        self.rotation_step = self.rotation_step.clamp(-360.0, 360.0);
        self.rotation = normalize_degrees(self.rotation + self.rotation_step);
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    /// Restore offset, rotation and step to their defaults
    pub fn reset(&mut self) {
        self.offset = Vec3::ZERO;
        self.rotation = 0.0;
        self.rotation_step = DEFAULT_ROTATION_STEP;
    }
}

/// Wrap an angle into [-360, 360)
pub fn normalize_degrees(mut degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    degrees %= 720.0;
    if degrees >= 360.0 {
        degrees -= 360.0;
    }
    if degrees < -360.0 {
        degrees += 360.0;
    }
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AxisSwizzle;

    #[test]
    fn test_extent_clamped_keeps_direction() {
        let limits = BrushLimits::new(10, 2, 1);
        let extent = BrushExtent::new(IVec3::new(-40, 5, i32::MAX)).clamped(limits);
        assert_eq!(extent.counts(), IVec3::new(-10, 2, 1));
        assert_eq!(BrushExtent::new(IVec3::new(3, -1, 1)).clamped(limits).counts(), IVec3::new(3, -1, 1));
    }

    #[test]
    fn test_rotate_step_wraps() {
        let mut brush = BrushState::default();
        for _ in 0..8 {
            brush.rotate_step();
        }
        assert_eq!(brush.rotation, 0.0);

        brush.rotation_step = -90.0;
        for _ in 0..4 {
            brush.rotate_step();
        }
        assert_eq!(brush.rotation, -360.0);
        brush.rotate_step();
        assert_eq!(brush.rotation, -90.0);
    }

    #[test]
    fn test_normalize_degrees_range() {
        for d in [-1000.0, -360.0, -359.0, 0.0, 359.0, 360.0, 725.0] {
            let n = normalize_degrees(d);
            assert!((-360.0..360.0).contains(&n), "{} -> {}", d, n);
        }
        assert_eq!(normalize_degrees(f32::NAN), 0.0);
    }

    #[test]
    fn test_extent_corners() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let a = Cell::new(Vec3::new(0.0, 0.0, 0.0));

        let e = BrushExtent::from_corners(&grid, a, Cell::new(Vec3::new(2.0, 0.0, -1.0)));
        // logical X = world x, logical Y = world z
        assert_eq!(e.counts(), IVec3::new(3, -2, 1));
        assert_eq!(e.cell_count(), 6);
        assert_eq!(e.far_corner(&grid, a), Cell::new(Vec3::new(2.0, 0.0, -1.0)));

        assert_eq!(BrushExtent::ONE.far_corner(&grid, a), a);
        assert_eq!(BrushExtent::new(IVec3::ZERO), BrushExtent::ONE);
    }

    #[test]
    fn test_surface_pick_per_tool() {
        assert_eq!(Tool::Paint.surface_pick(), SurfacePick::Above);
        assert_eq!(Tool::Eraser.surface_pick(), SurfacePick::At);
        assert_eq!(Tool::Dropper.surface_pick(), SurfacePick::At);
        assert!(Tool::Eraser.can_size());
        assert!(!Tool::Dropper.can_size());
    }
}
