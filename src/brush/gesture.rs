//! Two-corner drag that sets the brush extent.
//!
//! Idle -> Sizing on modifier + primary press while painting or erasing.
//! While sizing, pointer movement moves the second corner on the plane and
//! the wheel raises or lowers it in whole cells. Release or leaving the edit
//! surface commits and hands back the tool that was active before.

use crate::core::types::Vec3;
use crate::grid::{Cell, GridFrame};
use super::state::{BrushExtent, BrushLimits, Tool};

#[derive(Debug, Clone, Default)]
pub struct BrushSizeGesture {
    sizing: Option<Sizing>,
}

#[derive(Debug, Clone, Copy)]
struct Sizing {
    previous_tool: Tool,
    pos1: Cell,
    pos2: Cell,
    /// Cells above pos1 along up
    vertical: u32,
    extent: BrushExtent,
}

impl BrushSizeGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.sizing.is_some()
    }

    /// Start sizing from `pos1`. Only Paint and Eraser can start a drag.
    pub fn begin(&mut self, tool: Tool, pos1: Cell) -> bool {
        if self.sizing.is_some() || !tool.can_size() || !pos1.is_finite() {
            return false;
        }

        log::debug!("Brush sizing started at {:?} from {:?}", pos1, tool);
        self.sizing = Some(Sizing {
            previous_tool: tool,
            pos1,
            pos2: pos1,
            vertical: 0,
            extent: BrushExtent::ONE,
        });
        true
    }

    /// One wheel tick. Positive deltas shrink the vertical size, negative
    /// deltas grow it, within `[0, limit - 1]` cells above the first corner.
    pub fn scroll(&mut self, delta: f32, limits: BrushLimits) {
        let Some(sizing) = self.sizing.as_mut() else {
            return;
        };
        let max = limits.0.z.saturating_sub(1);
        if delta > 0.0 {
            sizing.vertical = sizing.vertical.saturating_sub(1);
        } else if delta < 0.0 {
            sizing.vertical = (sizing.vertical + 1).min(max);
        }
    }

    /// Move the second corner to the cell under the pointer and return the
    /// resulting extent. Planar axes are pulled back toward the first corner
    /// so no axis covers more than its limit.
    pub fn update(&mut self, grid: &GridFrame, pointer: Cell, limits: BrushLimits) -> Option<BrushExtent> {
        let sizing = self.sizing.as_mut()?;
        if !pointer.is_finite() {
            return Some(sizing.extent);
        }

        let cs = grid.cell_size();
        let p1 = grid.to_local(sizing.pos1.position());
        let p2 = grid.to_local(pointer.position());

        let x = clamp_axis(p1.x, p2.x, cs.x, limits.0.x);
        let y = clamp_axis(p1.y, p2.y, cs.y, limits.0.y);
        let z = p1.z + sizing.vertical as f32 * cs.z;

        sizing.pos2 = Cell::new(grid.to_world(Vec3::new(x, y, z)));
        sizing.extent = BrushExtent::from_corners(grid, sizing.pos1, sizing.pos2);
        Some(sizing.extent)
    }

    /// Corners of the drag so far
    pub fn corners(&self) -> Option<(Cell, Cell)> {
        self.sizing.map(|s| (s.pos1, s.pos2))
    }

    /// Extent of the drag so far
    pub fn extent(&self) -> Option<BrushExtent> {
        self.sizing.map(|s| s.extent)
    }

    /// End the drag. Returns the tool to restore and the committed extent.
    pub fn finish(&mut self) -> Option<(Tool, BrushExtent)> {
        let sizing = self.sizing.take()?;
        log::debug!("Brush sizing committed: {:?}", sizing.extent.counts());
        Some((sizing.previous_tool, sizing.extent))
    }
}

/// Limit `|b - a| / cell + 1` to `limit` cells by moving `b` toward `a`
fn clamp_axis(a: f32, b: f32, cell: f32, limit: u32) -> f32 {
    let span = ((b - a) / cell).round();
    let max_span = limit.saturating_sub(1) as f32;
    if span.abs() <= max_span {
        return a + span * cell;
    }
    a + span.signum() * max_span * cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::grid::AxisSwizzle;

    fn cell(x: f32, y: f32, z: f32) -> Cell {
        Cell::new(Vec3::new(x, y, z))
    }

    #[test]
    fn test_drag_is_clamped_to_limit() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let limits = BrushLimits::default();
        let mut gesture = BrushSizeGesture::new();

        assert!(gesture.begin(Tool::Paint, cell(0.0, 0.0, 0.0)));
        let extent = gesture.update(&grid, cell(15.0, 0.0, 0.0), limits).unwrap();
        assert_eq!(extent.counts().x, 10);

        let (tool, committed) = gesture.finish().unwrap();
        assert_eq!(tool, Tool::Paint);
        assert_eq!(committed.counts(), IVec3::new(10, 1, 1));
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_negative_drag_clamped() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut gesture = BrushSizeGesture::new();
        gesture.begin(Tool::Eraser, cell(0.0, 0.0, 0.0));
        let extent = gesture.update(&grid, cell(-3.0, 0.0, -20.0), BrushLimits::new(10, 4, 10)).unwrap();
        assert_eq!(extent.counts(), IVec3::new(-4, -4, 1));
        assert_eq!(gesture.corners().unwrap().1, cell(-3.0, 0.0, -3.0));
    }

    #[test]
    fn test_scroll_vertical_clamped() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let limits = BrushLimits::new(10, 10, 3);
        let mut gesture = BrushSizeGesture::new();
        gesture.begin(Tool::Paint, cell(0.0, 0.0, 0.0));

        gesture.scroll(1.0, limits);
        assert_eq!(gesture.update(&grid, cell(0.0, 0.0, 0.0), limits).unwrap().counts().z, 1);

        for _ in 0..5 {
            gesture.scroll(-1.0, limits);
        }
        let extent = gesture.update(&grid, cell(0.0, 0.0, 0.0), limits).unwrap();
        assert_eq!(extent.counts().z, 3);
        // up is world y under XZY
        assert_eq!(gesture.corners().unwrap().1, cell(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_only_paint_or_eraser_can_begin() {
        let mut gesture = BrushSizeGesture::new();
        assert!(!gesture.begin(Tool::Dropper, cell(0.0, 0.0, 0.0)));
        assert!(!gesture.begin(Tool::None, cell(0.0, 0.0, 0.0)));
        assert!(gesture.finish().is_none());
    }
}
