//! Gridpaint - grid-based 3D prefab painting

pub mod core;
pub mod math;
pub mod grid;
pub mod brush;
pub mod palette;
pub mod edit;
pub mod host;
pub mod session;
