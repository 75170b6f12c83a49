//! Grid cell addressed by its snapped world position.

use std::hash::{Hash, Hasher};
use crate::core::types::Vec3;

/// Spacing of the lattice cell positions are compared on (world units)
pub const CELL_QUANTUM: f32 = 1.0e-3;

/// A grid cell, stored as the world-space position it snaps to.
///
/// Equality and hashing round the position to `CELL_QUANTUM`, so the same
/// cell reached through different float arithmetic keys maps and sets once.
#[derive(Debug, Clone, Copy)]
pub struct Cell(Vec3);

impl Cell {
    pub fn new(position: Vec3) -> Self {
        Self(position)
    }

    /// World position of the cell
    #[inline]
    pub fn position(self) -> Vec3 {
        self.0
    }

    /// False when any coordinate is infinite or NaN
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    #[inline]
    fn key(self) -> [i64; 3] {
        let q = |v: f32| (f64::from(v) / f64::from(CELL_QUANTUM)).round() as i64;
        [q(self.0.x), q(self.0.y), q(self.0.z)]
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<Vec3> for Cell {
    fn from(position: Vec3) -> Self {
        Self(position)
    }
}
