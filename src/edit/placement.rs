//! Paint, erase and dropper operations.
//!
//! Every operation works on an already-built cell list and reports each
//! created or destroyed instance to the undo log inside one group. A failure
//! on one cell is logged and the remaining cells are still processed.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::brush::{GroupBrushSet, WeightedPaletteSelector};
use crate::core::types::{Quat, Vec3};
use crate::grid::{Cell, GridFrame};
use crate::host::{LayerMask, ObjectHandle, Parent, SceneHost};
use crate::palette::{PaletteEntry, PaletteId, PaletteSelection};
use super::occupancy::OccupancyIndex;
use super::record::{PlacedObjectRecord, Tilemap};
use super::undo::UndoLog;

/// What one stamp puts into a cell
#[derive(Debug, Clone, PartialEq)]
pub enum Stamp {
    /// One instance of the entry on the cell
    Single(PaletteEntry),
    /// `density` weighted picks scattered over the cell footprint
    Group {
        choices: Vec<PaletteEntry>,
        weights: Vec<f32>,
        density: u32,
        random_rotation: bool,
    },
}

/// Per-stamp parameters
#[derive(Debug, Clone, Copy)]
pub struct PaintOptions {
    /// Degrees around up
    pub rotation: f32,
    /// World offset added to every instance
    pub offset: Vec3,
    /// Destroy occupants and paint over them
    pub replace: bool,
    pub parent: Parent,
    pub layer_mask: LayerMask,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            offset: Vec3::ZERO,
            replace: false,
            parent: Parent::Tilemap,
            layer_mask: LayerMask::ALL,
        }
    }
}

/// Host objects an operation writes to
pub struct EditTarget<'a> {
    pub scene: &'a mut dyn SceneHost,
    pub undo: &'a mut dyn UndoLog,
    pub tilemap: &'a mut Tilemap,
    /// Cells already handled during the current drag
    pub visited: &'a mut HashSet<Cell>,
}

/// Read-only view the dropper samples from
#[derive(Clone, Copy)]
pub struct DropperSource<'a> {
    pub scene: &'a dyn SceneHost,
    pub tilemap: &'a Tilemap,
    pub palette: &'a [PaletteEntry],
}

/// List a dropper pick is written to
pub enum PickInto<'a> {
    /// Becomes the only selected entry
    Replace(&'a mut PaletteSelection),
    /// Joins the multi-selection
    Add(&'a mut PaletteSelection),
    /// Joins the group brush members at full weight
    Group(&'a mut GroupBrushSet),
}

pub struct PlacementEngine {
    rng: SmallRng,
    selector: WeightedPaletteSelector,
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Engine with a fixed seed, for reproducible scatter
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self { rng, selector: WeightedPaletteSelector::new() }
    }

    /// Stamp `stamp` into every eligible cell of `cells`.
    ///
    /// Empty cells are painted. Occupied cells are painted only with
    /// `replace`, after their occupants are destroyed. Visited cells are
    /// skipped and painted cells become visited. Returns the created handles.
    pub fn paint(
        &mut self,
        target: EditTarget<'_>,
        grid: &GridFrame,
        cells: &[Cell],
        stamp: Option<&Stamp>,
        options: &PaintOptions,
    ) -> Vec<ObjectHandle> {
        let Some(stamp) = stamp else {
            log::debug!("Nothing selected in the palette; paint skipped");
            return Vec::new();
        };
        if let Stamp::Group { choices, weights, .. } = stamp {
            if choices.is_empty() {
                log::warn!("Group brush has no entries; paint skipped");
                return Vec::new();
            }
            let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
            if !(total > 0.0 && total.is_finite()) {
                log::warn!("Group brush weights sum to {}; every instance uses {}", total, choices[0].name);
            }
        }

        let EditTarget { scene, undo, tilemap, visited } = target;
        tilemap.prune(|h| scene.exists(h));

        let occupancy = OccupancyIndex::new(grid, options.layer_mask).classify(cells, tilemap.records(), visited, options.rotation);

        let mut created = Vec::new();
        undo.begin_group("Paint");
        for (cell, occupants) in occupancy.iter() {
            if !occupants.is_empty() {
                if !options.replace {
                    continue;
                }
                for occupant in occupants {
                    destroy(scene, undo, tilemap, occupant.handle, "Replace");
                }
            }

            visited.insert(cell);
            for (entry, position, rotation) in self.placements(grid, cell, stamp, options) {
                match scene.instantiate(&entry, position, rotation, options.parent) {
                    Ok(handle) => {
                        undo.record_created(handle, &format!("Created {}", entry.name));
                        tilemap.push(PlacedObjectRecord {
                            handle,
                            position,
                            rotation,
                            palette: entry.id.clone(),
                            layer: scene.layer_of(handle).unwrap_or(0),
                            cell: Some(cell),
                        });
                        created.push(handle);
                    }
                    Err(e) => log::warn!("Could not place {} at {:?}: {}", entry.name, cell, e),
                }
            }
        }
        undo.end_group();

        if !created.is_empty() {
            log::debug!("Painted {} objects into {} cells", created.len(), occupancy.len());
        }
        created
    }

    /// Destroy every occupant of `cells` on a layer in `layer_mask`.
    /// Cells that had occupants become visited.
    pub fn erase(
        &mut self,
        target: EditTarget<'_>,
        grid: &GridFrame,
        cells: &[Cell],
        rotation: f32,
        layer_mask: LayerMask,
    ) -> Vec<ObjectHandle> {
        let EditTarget { scene, undo, tilemap, visited } = target;
        tilemap.prune(|h| scene.exists(h));

        let occupancy = OccupancyIndex::new(grid, layer_mask).classify(cells, tilemap.records(), visited, rotation);

        let mut destroyed = Vec::new();
        undo.begin_group("Erase");
        for (cell, occupants) in occupancy.iter() {
            for occupant in occupants {
                visited.insert(cell);
                if destroy(scene, undo, tilemap, occupant.handle, "Erase") {
                    destroyed.push(occupant.handle);
                }
            }
        }
        undo.end_group();

        if !destroyed.is_empty() {
            log::debug!("Erased {} objects", destroyed.len());
        }
        destroyed
    }

    /// Pick the palette entry of an occupant of `cell` into `into`.
    ///
    /// The entry is resolved through the host's source definition first and
    /// must be present in the palette.
    pub fn dropper(&self, source: DropperSource<'_>, grid: &GridFrame, cell: Cell, layer_mask: LayerMask, into: PickInto<'_>) -> Option<PaletteEntry> {
        let DropperSource { scene, tilemap, palette } = source;
        let occupancy = OccupancyIndex::new(grid, layer_mask).classify(&[cell], tilemap.records(), &HashSet::new(), 0.0);

        let id: PaletteId = occupancy
            .occupants_at(cell)
            .iter()
            .filter(|r| scene.exists(r.handle))
            .find_map(|r| scene.source_of(r.handle).or_else(|| Some(r.palette.clone())))?;

        let Some(entry) = palette.iter().find(|e| e.id == id).cloned() else {
            log::warn!("Dropper: {} is not in the palette", id.as_str());
            return None;
        };

        match into {
            PickInto::Replace(selection) => selection.select_single(entry.id.clone()),
            PickInto::Add(selection) => {
                selection.add(entry.id.clone());
            }
            PickInto::Group(group) => {
                group.add(&entry);
            }
        }
        log::debug!("Dropper picked {}", entry.name);
        Some(entry)
    }

    /// Entry, world position and orientation of every instance a stamp puts
    /// into `cell`
    fn placements(&mut self, grid: &GridFrame, cell: Cell, stamp: &Stamp, options: &PaintOptions) -> Vec<(PaletteEntry, Vec3, Quat)> {
        match stamp {
            Stamp::Single(entry) => {
                vec![(entry.clone(), cell.position() + options.offset, grid.up_rotation(options.rotation))]
            }
            Stamp::Group { choices, weights, density, random_rotation } => {
                let cs = grid.cell_size();
                let amount = (*density).max(1);
                let average = cs.x / amount as f32;
                let jitter = self.rng.gen_range(0.0..=average * 0.5);

                let mut out = Vec::with_capacity(amount as usize);
                for i in 0..amount {
                    let Some(index) = self.selector.select_index(weights, &mut self.rng) else {
                        break;
                    };
                    let Some(entry) = choices.get(index) else {
                        continue;
                    };

                    let x = average * i as f32 + jitter - cs.x * 0.5;
                    let y = self.rng.gen_range(0.0..cs.y) - cs.y * 0.5;
                    let scatter = grid.swizzle().to_world(Vec3::new(x, y, 0.0));

                    let degrees = if *random_rotation {
                        self.rng.gen_range(0.0..360.0)
                    } else {
                        options.rotation
                    };

                    out.push((entry.clone(), cell.position() + scatter + options.offset, grid.up_rotation(degrees)));
                }
                out
            }
        }
    }
}

/// Destroy `handle` if it still exists, reporting it to the undo log first
fn destroy(scene: &mut dyn SceneHost, undo: &mut dyn UndoLog, tilemap: &mut Tilemap, handle: ObjectHandle, label: &str) -> bool {
    tilemap.remove(handle);
    if !scene.exists(handle) {
        return false;
    }
    undo.record_destroyed(handle, label);
    scene.destroy(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::UndoRecorder;
    use crate::grid::AxisSwizzle;
    use crate::host::EcsScene;

    struct Fixture {
        scene: EcsScene,
        undo: UndoRecorder,
        tilemap: Tilemap,
        visited: HashSet<Cell>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: EcsScene::new(Vec3::Y),
                undo: UndoRecorder::new(),
                tilemap: Tilemap::new("Level"),
                visited: HashSet::new(),
            }
        }

        fn target(&mut self) -> EditTarget<'_> {
            EditTarget {
                scene: &mut self.scene,
                undo: &mut self.undo,
                tilemap: &mut self.tilemap,
                visited: &mut self.visited,
            }
        }
    }

    fn entry(name: &str) -> PaletteEntry {
        PaletteEntry::new(format!("Props/{name}.prefab"), "Props", name)
    }

    fn cell(x: f32, y: f32, z: f32) -> Cell {
        Cell::new(Vec3::new(x, y, z))
    }

    #[test]
    fn test_single_paint_end_to_end() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(1);
        let options = PaintOptions {
            rotation: 90.0,
            offset: Vec3::new(0.0, 0.25, 0.0),
            ..Default::default()
        };

        let stamp = Stamp::Single(entry("crate"));
        let created = engine.paint(fx.target(), &grid, &[cell(3.0, 0.0, 5.0)], Some(&stamp), &options);
        assert_eq!(created.len(), 1);

        let transform = fx.scene.transform_of(created[0]).unwrap();
        assert_eq!(transform.position, Vec3::new(3.0, 0.25, 5.0));
        let expected = Quat::from_rotation_y(90f32.to_radians());
        assert!(transform.rotation.angle_between(expected) < 1e-4);

        assert_eq!(fx.undo.created().collect::<Vec<_>>(), created);
        assert_eq!(fx.tilemap.len(), 1);
        assert_eq!(fx.tilemap.records()[0].cell, Some(cell(3.0, 0.0, 5.0)));
    }

    #[test]
    fn test_paint_is_idempotent_within_drag() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(1);
        let stamp = Stamp::Single(entry("crate"));
        let cells = [cell(0.5, 0.0, 0.5), cell(1.5, 0.0, 0.5)];

        let first = engine.paint(fx.target(), &grid, &cells, Some(&stamp), &PaintOptions::default());
        let second = engine.paint(fx.target(), &grid, &cells, Some(&stamp), &PaintOptions::default());
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(fx.scene.instances().len(), 2);
    }

    #[test]
    fn test_occupied_cell_needs_replace() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(1);
        let c = [cell(0.5, 0.0, 0.5)];

        let old = engine.paint(fx.target(), &grid, &c, Some(&Stamp::Single(entry("a"))), &PaintOptions::default());
        fx.visited.clear();

        let blocked = engine.paint(fx.target(), &grid, &c, Some(&Stamp::Single(entry("b"))), &PaintOptions::default());
        assert!(blocked.is_empty());

        let replace = PaintOptions { replace: true, ..Default::default() };
        let new = engine.paint(fx.target(), &grid, &c, Some(&Stamp::Single(entry("b"))), &replace);
        assert_eq!(new.len(), 1);
        assert!(!fx.scene.exists(old[0]));
        assert_eq!(fx.undo.destroyed().collect::<Vec<_>>(), old);
        assert_eq!(fx.tilemap.len(), 1);
        assert_eq!(fx.scene.source_of(new[0]), Some(PaletteId::new("Props/b.prefab")));
    }

    #[test]
    fn test_group_paint_scatters_inside_cell() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(42);
        let offset = Vec3::new(0.0, 0.1, 0.0);
        let options = PaintOptions { offset, ..Default::default() };
        let stamp = Stamp::Group {
            choices: vec![entry("tree"), entry("bush")],
            weights: vec![0.9, 0.1],
            density: 4,
            random_rotation: true,
        };

        let target_cell = cell(2.5, 0.0, 2.5);
        let created = engine.paint(fx.target(), &grid, &[target_cell], Some(&stamp), &options);
        assert_eq!(created.len(), 4);

        let bounds = grid.cell_bounds(target_cell, 1.0);
        for handle in &created {
            let position = fx.scene.transform_of(*handle).unwrap().position;
            assert!(bounds.contains_point(position - offset), "{} outside cell", position);
            let source = fx.scene.source_of(*handle).unwrap();
            assert!(source.as_str().ends_with("tree.prefab") || source.as_str().ends_with("bush.prefab"));
        }
    }

    #[test]
    fn test_zero_total_weight_uses_first_entry() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(8);
        let stamp = Stamp::Group {
            choices: vec![entry("first"), entry("second")],
            weights: vec![0.0, 0.0],
            density: 5,
            random_rotation: false,
        };

        let created = engine.paint(fx.target(), &grid, &[cell(0.5, 0.0, 0.5)], Some(&stamp), &PaintOptions::default());
        assert_eq!(created.len(), 5);
        for handle in created {
            assert_eq!(fx.scene.source_of(handle), Some(entry("first").id));
        }
    }

    #[test]
    fn test_unloadable_entry_does_not_abort_other_cells() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(3);
        let bad = entry("bad");
        fx.scene.mark_unloadable(bad.id.clone());

        let stamp = Stamp::Group {
            choices: vec![bad, entry("good")],
            weights: vec![0.5, 0.5],
            density: 20,
            random_rotation: false,
        };
        let cells = [cell(0.5, 0.0, 0.5), cell(1.5, 0.0, 0.5)];
        let created = engine.paint(fx.target(), &grid, &cells, Some(&stamp), &PaintOptions::default());
        assert!(!created.is_empty());
        assert!(created.len() < 40);
        assert_eq!(fx.visited.len(), 2);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(1);
        let created = engine.paint(fx.target(), &grid, &[cell(0.5, 0.0, 0.5)], None, &PaintOptions::default());
        assert!(created.is_empty());
        assert!(fx.undo.groups().is_empty());
    }

    #[test]
    fn test_erase_skips_already_destroyed() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(1);
        let cells = [cell(0.5, 0.0, 0.5), cell(1.5, 0.0, 0.5)];
        let created = engine.paint(fx.target(), &grid, &cells, Some(&Stamp::Single(entry("a"))), &PaintOptions::default());
        fx.visited.clear();

        // Destroyed behind the painter's back
        fx.scene.destroy(created[0]);

        let erased = engine.erase(fx.target(), &grid, &cells, 0.0, LayerMask::ALL);
        assert_eq!(erased, vec![created[1]]);
        assert!(fx.tilemap.is_empty());

        let again = engine.erase(fx.target(), &grid, &cells, 0.0, LayerMask::ALL);
        assert!(again.is_empty());
    }

    #[test]
    fn test_erase_respects_layer_filter() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        fx.scene.set_default_layer(4);
        let mut engine = PlacementEngine::seeded(1);
        let cells = [cell(0.5, 0.0, 0.5)];
        engine.paint(fx.target(), &grid, &cells, Some(&Stamp::Single(entry("a"))), &PaintOptions::default());
        fx.visited.clear();

        assert!(engine.erase(fx.target(), &grid, &cells, 0.0, LayerMask::from_layers(&[1])).is_empty());
        assert_eq!(engine.erase(fx.target(), &grid, &cells, 0.0, LayerMask::from_layers(&[4])).len(), 1);
    }

    #[test]
    fn test_dropper_selects_source_entry() {
        let grid = GridFrame::unit(AxisSwizzle::Xzy);
        let mut fx = Fixture::new();
        let mut engine = PlacementEngine::seeded(1);
        let palette = vec![entry("a"), entry("b")];
        let c = cell(0.5, 0.0, 0.5);
        engine.paint(fx.target(), &grid, &[c], Some(&Stamp::Single(palette[1].clone())), &PaintOptions::default());

        let mut selection = PaletteSelection::new();
        selection.select_single(palette[0].id.clone());
        let source = DropperSource { scene: &fx.scene, tilemap: &fx.tilemap, palette: &palette };

        let picked = engine.dropper(source, &grid, c, LayerMask::ALL, PickInto::Replace(&mut selection));
        assert_eq!(picked.as_ref().map(|e| e.name.as_str()), Some("b"));
        assert_eq!(selection.ids(), &[palette[1].id.clone()]);

        selection.select_single(palette[0].id.clone());
        engine.dropper(source, &grid, c, LayerMask::ALL, PickInto::Add(&mut selection));
        assert_eq!(selection.len(), 2);

        let mut group = GroupBrushSet::default();
        group.add(&palette[0]);
        engine.dropper(source, &grid, c, LayerMask::ALL, PickInto::Group(&mut group));
        engine.dropper(source, &grid, c, LayerMask::ALL, PickInto::Group(&mut group));
        assert_eq!(group.entries.len(), 2);
        assert!(group.contains(&palette[1].id));

        let empty = engine.dropper(source, &grid, cell(9.5, 0.0, 9.5), LayerMask::ALL, PickInto::Add(&mut selection));
        assert!(empty.is_none());
    }
}
