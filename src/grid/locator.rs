//! Pointer ray -> grid cell resolution.

use serde::{Deserialize, Serialize};
use crate::core::types::{Vec2, Vec3};
use crate::host::{LayerMask, RaycastProvider};
use crate::math::{Plane, Ray};
use super::cell::Cell;
use super::frame::{BrushAnchor, GridFrame};

/// How the pointer is turned into a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Follow scene geometry under the pointer, falling back to the grid base plane
    #[default]
    Auto,
    /// Ignore geometry; intersect a plane at the configured floor
    Manual,
}

/// Which cell to pick when the pointer lands on existing geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePick {
    /// Stack on top of the hit object (painting)
    Above,
    /// The hit object's own cell (erasing, sampling)
    At,
}

/// Inputs to cell resolution that come from editor settings
#[derive(Debug, Clone, Copy)]
pub struct LocatorSettings {
    pub mode: SelectionMode,
    /// Floor level in cells above the grid origin (Manual mode)
    pub floor: i32,
    /// Planar offset added after snapping, logical (X, Y)
    pub offset: Vec2,
    pub anchor: BrushAnchor,
    pub layer_mask: LayerMask,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Auto,
            floor: 0,
            offset: Vec2::ZERO,
            anchor: BrushAnchor::Center,
            layer_mask: LayerMask::ALL,
        }
    }
}

/// Resolves pointer rays to grid cells
pub struct CellLocator<'a> {
    grid: &'a GridFrame,
    settings: LocatorSettings,
}

impl<'a> CellLocator<'a> {
    pub fn new(grid: &'a GridFrame, settings: LocatorSettings) -> Self {
        Self { grid, settings }
    }

    /// World up-coordinate of the Manual-mode floor plane
    pub fn floor_height(&self) -> f32 {
        self.grid.base_height() + self.settings.floor as f32 * self.grid.cell_height()
    }

    /// Resolve `ray` to a cell. `None` means there is nothing to select this
    /// frame (ray parallel to the reference plane or a non-finite result).
    pub fn resolve<R: RaycastProvider + ?Sized>(&self, ray: &Ray, pick: SurfacePick, raycaster: &R) -> Option<Cell> {
        let up = self.grid.up_index();

        let (point, offset, height) = match self.settings.mode {
            SelectionMode::Auto => match raycaster.cast(ray, f32::INFINITY, self.settings.layer_mask) {
                Some(hit) => {
                    let height = if hit.bounds_top.is_some() {
                        match pick {
                            SurfacePick::Above => stack_height(hit.point[up], hit.is_trigger),
                            SurfacePick::At => hit.object_position[up],
                        }
                    } else {
                        self.level_of(hit.point[up])
                    };
                    (hit.point, Vec2::ZERO, height)
                }
                None => {
                    let base = self.grid.base_height();
                    (self.plane_point(ray, base)?, self.settings.offset, base)
                }
            },
            SelectionMode::Manual => {
                let floor = self.floor_height();
                (self.plane_point(ray, floor)?, self.settings.offset, floor)
            }
        };

        if !point.is_finite() || !height.is_finite() {
            return None;
        }

        let mut local = self.grid.snap_planar(self.grid.to_local(point), self.settings.anchor);
        local.x += offset.x;
        local.y += offset.y;
        local.z = height - self.grid.base_height();

        let cell = Cell::new(self.grid.to_world(local));
        cell.is_finite().then_some(cell)
    }

    /// Up-coordinate of the bottom of the cell layer containing `up_coord`
    fn level_of(&self, up_coord: f32) -> f32 {
        let base = self.grid.base_height();
        let height = self.grid.cell_height();
        base + ((up_coord - base) / height).floor() * height
    }

    fn plane_point(&self, ray: &Ray, height: f32) -> Option<Vec3> {
        let up = self.grid.up_vector();
        let plane = Plane::from_point_normal(up * height, up);
        let t = ray.intersect_plane(&plane)?;
        Some(ray.at(t))
    }
}

/// Height of the cell to stack into from a raw hit coordinate along up.
///
/// Rounds up to the next whole unit when the fractional part is at least one
/// half and the hit collider is solid. Works on the raw world coordinate, so
/// meshes whose origin is not at their base can stack one level off.
fn stack_height(hit_up: f32, is_trigger: bool) -> f32 {
    let whole = hit_up.trunc();
    let fraction = hit_up % 1.0;
    if fraction >= 0.5 && !is_trigger {
        whole + 1.0
    } else {
        whole
    }
}
