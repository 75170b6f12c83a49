//! Grid geometry: axis swizzles, cells, pointer picking and brush selections.

pub mod swizzle;
pub mod cell;
pub mod frame;
pub mod locator;
pub mod selection;

// Re-exports
pub use swizzle::{Axis, AxisSwizzle, compose, resolve_axis};
pub use cell::Cell;
pub use frame::{BrushAnchor, GridFrame, is_right_angle};
pub use locator::{CellLocator, LocatorSettings, SelectionMode, SurfacePick};
pub use selection::SelectionAreaBuilder;
