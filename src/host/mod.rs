//! Host-side collaborators: raycasting and the scene graph that owns instances.
//!
//! The painter never owns placed objects. It asks the host to create and
//! destroy them and keeps only handles.

pub mod ecs;

use serde::{Deserialize, Serialize};
use crate::core::types::{Quat, Result, Vec3};
use crate::math::Ray;
use crate::palette::{PaletteEntry, PaletteId};

pub use ecs::EcsScene;

/// Opaque handle to an object instance living in the host scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

/// 32-bit layer membership mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    pub fn from_layers(layers: &[u32]) -> Self {
        LayerMask(layers.iter().filter(|&&l| l < 32).fold(0, |mask, &l| mask | (1 << l)))
    }

    /// Whether `layer` (0..32) is part of the mask
    #[inline]
    pub fn contains(self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// Result of a host raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// World point where the ray met the collider
    pub point: Vec3,
    /// Layer of the hit object
    pub layer: u32,
    /// Top of the hit object's render bounds along up, if it has any
    pub bounds_top: Option<f32>,
    /// World position (pivot) of the hit object
    pub object_position: Vec3,
    /// Trigger volumes never stack
    pub is_trigger: bool,
}

/// Ray queries against collidable scene geometry
pub trait RaycastProvider {
    /// Nearest hit along `ray` within `max_distance` on a layer in `mask`
    fn cast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RaycastHit>;
}

/// Where a new instance is attached in the host hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Child of the tilemap being painted
    Tilemap,
    /// Top level of the scene (mechanic objects)
    SceneRoot,
}

/// Host scene graph. Owns every instance the painter creates.
pub trait SceneHost: RaycastProvider {
    /// Spawn an instance of `entry`
    fn instantiate(&mut self, entry: &PaletteEntry, position: Vec3, rotation: Quat, parent: Parent) -> Result<ObjectHandle>;

    /// Destroy an instance. Returns false if it was already gone.
    fn destroy(&mut self, handle: ObjectHandle) -> bool;

    /// Whether the instance still exists
    fn exists(&self, handle: ObjectHandle) -> bool;

    /// Authoritative palette definition the instance came from
    fn source_of(&self, handle: ObjectHandle) -> Option<PaletteId>;

    /// Layer the instance lives on
    fn layer_of(&self, handle: ObjectHandle) -> Option<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::from_layers(&[0, 5, 40]);
        assert!(mask.contains(0));
        assert!(mask.contains(5));
        assert!(!mask.contains(1));
        assert!(!mask.contains(40));
        assert!(LayerMask::ALL.contains(31));
        assert!(!LayerMask::NONE.contains(0));
    }
}
