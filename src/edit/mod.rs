//! Placed-object bookkeeping and the paint / erase / dropper operations.

pub mod record;
pub mod occupancy;
pub mod undo;
pub mod placement;

pub use record::{PlacedObjectRecord, Tilemap};
pub use occupancy::{Occupancy, OccupancyIndex};
pub use undo::{UndoGroup, UndoLog, UndoOp, UndoRecorder};
pub use placement::{DropperSource, EditTarget, PaintOptions, PickInto, PlacementEngine, Stamp};
