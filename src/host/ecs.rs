//! Reference scene host on a `hecs` world.
//!
//! Placed instances and static level geometry are entities with a world box
//! used for picking. Prefab sizes are looked up per palette id and default
//! to a unit cube standing on its pivot.

use std::collections::HashMap;

use hecs::{Entity, World};

use crate::core::error::Error;
use crate::core::types::{Quat, Result, Vec3};
use crate::math::{Aabb, Ray};
use crate::palette::{PaletteEntry, PaletteId};
use super::{LayerMask, ObjectHandle, Parent, RaycastHit, RaycastProvider, SceneHost};

/// World transform of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Layer the entity is on (0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer(pub u32);

/// World-space pick box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint(pub Aabb);

/// Palette definition an instance was spawned from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source(pub PaletteId);

/// Hierarchy slot an instance was attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment(pub Parent);

/// Colliders flagged as triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger;

pub struct EcsScene {
    world: World,
    up: Vec3,
    handles: HashMap<ObjectHandle, Entity>,
    next_handle: u64,
    sizes: HashMap<PaletteId, Vec3>,
    default_layer: u32,
    /// Palette ids that fail to instantiate
    broken: Vec<PaletteId>,
}

impl EcsScene {
    /// Empty scene with `up` as the vertical axis (unit world axis)
    pub fn new(up: Vec3) -> Self {
        Self {
            world: World::new(),
            up,
            handles: HashMap::new(),
            next_handle: 1,
            sizes: HashMap::new(),
            default_layer: 0,
            broken: Vec::new(),
        }
    }

    /// Size of instances of `id` (world axes). Unit cube when unset.
    pub fn set_prefab_size(&mut self, id: PaletteId, size: Vec3) {
        self.sizes.insert(id, size);
    }

    /// Layer given to new instances
    pub fn set_default_layer(&mut self, layer: u32) {
        self.default_layer = layer;
    }

    /// Make instantiating `id` fail, like an asset that cannot be loaded
    pub fn mark_unloadable(&mut self, id: PaletteId) {
        self.broken.push(id);
    }

    /// Add non-palette level geometry (floors, walls) that can be hit by rays
    pub fn spawn_static(&mut self, bounds: Aabb, layer: u32) -> ObjectHandle {
        let entity = self.world.spawn((
            Transform { position: bounds.center(), rotation: Quat::IDENTITY },
            Layer(layer),
            Footprint(bounds),
        ));
        self.register(entity)
    }

    /// Add a trigger volume; rays hit it but stacking ignores its height
    pub fn spawn_trigger(&mut self, bounds: Aabb, layer: u32) -> ObjectHandle {
        let entity = self.world.spawn((
            Transform { position: bounds.center(), rotation: Quat::IDENTITY },
            Layer(layer),
            Footprint(bounds),
            Trigger,
        ));
        self.register(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn transform_of(&self, handle: ObjectHandle) -> Option<Transform> {
        let entity = *self.handles.get(&handle)?;
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    pub fn parent_of(&self, handle: ObjectHandle) -> Option<Parent> {
        let entity = *self.handles.get(&handle)?;
        self.world.get::<&Attachment>(entity).ok().map(|a| a.0)
    }

    /// Handles of all instances spawned from palette entries, in handle order
    pub fn instances(&self) -> Vec<ObjectHandle> {
        let mut handles: Vec<ObjectHandle> = self
            .handles
            .iter()
            .filter(|(_, e)| self.world.get::<&Source>(**e).is_ok())
            .map(|(h, _)| *h)
            .collect();
        handles.sort();
        handles
    }

    fn register(&mut self, entity: Entity) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, entity);
        handle
    }

    fn handle_of(&self, entity: Entity) -> Option<ObjectHandle> {
        self.handles.iter().find(|(_, e)| **e == entity).map(|(h, _)| *h)
    }

    fn footprint_for(&self, id: &PaletteId, position: Vec3) -> Aabb {
        let size = self.sizes.get(id).copied().unwrap_or(Vec3::ONE);
        let half = size * 0.5;
        // Pivot sits on the bottom face
        Aabb::from_center_half_extent(position + self.up * half, half)
    }

    fn up_index(&self) -> usize {
        if self.up.x.abs() > 0.5 {
            0
        } else if self.up.y.abs() > 0.5 {
            1
        } else {
            2
        }
    }
}

impl RaycastProvider for EcsScene {
    fn cast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RaycastHit> {
        let up = self.up_index();
        let mut best: Option<(f32, RaycastHit)> = None;

        let mut query = self.world.query::<(&Transform, &Layer, &Footprint, Option<&Trigger>)>();
        for (_entity, (transform, layer, footprint, trigger)) in query.iter() {
            if !mask.contains(layer.0) {
                continue;
            }
            let Some((t_enter, t_exit)) = ray.intersects_aabb(&footprint.0) else {
                continue;
            };
            if t_exit < 0.0 {
                continue;
            }
            let t = t_enter.max(0.0);
            if t > max_distance || best.as_ref().is_some_and(|(d, _)| t >= *d) {
                continue;
            }

            best = Some((t, RaycastHit {
                point: ray.at(t),
                layer: layer.0,
                bounds_top: Some(footprint.0.max[up]),
                object_position: transform.position,
                is_trigger: trigger.is_some(),
            }));
        }

        best.map(|(_, hit)| hit)
    }
}

impl SceneHost for EcsScene {
    fn instantiate(&mut self, entry: &PaletteEntry, position: Vec3, rotation: Quat, parent: Parent) -> Result<ObjectHandle> {
        if self.broken.contains(&entry.id) {
            return Err(Error::Scene(format!("cannot load {}", entry.id.as_str())));
        }
        if !position.is_finite() {
            return Err(Error::Scene(format!("non-finite position for {}", entry.id.as_str())));
        }

        let footprint = self.footprint_for(&entry.id, position);
        let entity = self.world.spawn((
            Transform { position, rotation },
            Layer(self.default_layer),
            Footprint(footprint),
            Source(entry.id.clone()),
            Attachment(parent),
        ));
        let handle = self.register(entity);
        log::trace!("Spawned {} as {:?} at {}", entry.name, handle, position);
        Ok(handle)
    }

    fn destroy(&mut self, handle: ObjectHandle) -> bool {
        let Some(entity) = self.handles.remove(&handle) else {
            return false;
        };
        self.world.despawn(entity).is_ok()
    }

    fn exists(&self, handle: ObjectHandle) -> bool {
        self.handles.get(&handle).is_some_and(|e| self.world.contains(*e))
    }

    fn source_of(&self, handle: ObjectHandle) -> Option<PaletteId> {
        let entity = *self.handles.get(&handle)?;
        self.world.get::<&Source>(entity).ok().map(|s| s.0.clone())
    }

    fn layer_of(&self, handle: ObjectHandle) -> Option<u32> {
        let entity = *self.handles.get(&handle)?;
        self.world.get::<&Layer>(entity).ok().map(|l| l.0)
    }
}

impl EcsScene {
    /// Handle of the object nearest along `ray`, if any
    pub fn pick(&self, ray: &Ray, mask: LayerMask) -> Option<ObjectHandle> {
        let mut best: Option<(f32, Entity)> = None;
        let mut query = self.world.query::<(&Layer, &Footprint)>();
        for (entity, (layer, footprint)) in query.iter() {
            if !mask.contains(layer.0) {
                continue;
            }
            if let Some((t_enter, t_exit)) = ray.intersects_aabb(&footprint.0) {
                let t = t_enter.max(0.0);
                if t_exit >= 0.0 && best.is_none_or(|(d, _)| t < d) {
                    best = Some((t, entity));
                }
            }
        }
        best.and_then(|(_, e)| self.handle_of(e))
    }
}
