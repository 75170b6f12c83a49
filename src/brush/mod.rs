//! Brush state, sizing gesture and group brush.

pub mod state;
pub mod gesture;
pub mod group;

pub use state::{BrushExtent, BrushLimits, BrushState, Tool, normalize_degrees};
pub use gesture::BrushSizeGesture;
pub use group::{GroupBrushEntry, GroupBrushSet, WeightedPaletteSelector};
