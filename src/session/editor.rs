//! The interactive editor: tool state machine and per-frame driver.
//!
//! An `EditorSession` is owned by the host shell. The host feeds it pointer
//! and key events along with mutable access to its scene and undo log, and
//! calls `update` once per frame.

use std::collections::HashSet;

use crate::brush::{BrushExtent, BrushSizeGesture, GroupBrushSet, Tool};
use crate::core::types::{Quat, Result, Vec3, Vec4};
use crate::edit::{DropperSource, EditTarget, PaintOptions, PickInto, PlacementEngine, Stamp, Tilemap, UndoLog};
use crate::grid::{Cell, CellLocator, GridFrame, SelectionAreaBuilder, SelectionMode};
use crate::host::{ObjectHandle, Parent, SceneHost};
use crate::math::Ray;
use crate::palette::{PaletteEntry, PaletteId, PaletteSelection, PaletteSource};
use super::settings::{self, EditorSettings, PreferenceStore};

pub const PAINT_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
pub const ERASER_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const NEUTRAL_COLOR: Vec4 = Vec4::ONE;

/// Keyboard shortcuts the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Paint,
    Eraser,
    Dropper,
    Rotate,
    FloorUp,
    FloorDown,
    /// Drop back to no tool
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Input delivered by the host, already turned into world rays
#[derive(Debug, Clone, Copy)]
pub enum EditorEvent {
    PointerMoved { ray: Ray },
    PointerDown { button: PointerButton, ray: Ray, modifiers: Modifiers },
    PointerUp { button: PointerButton },
    /// Positive deltas scroll down
    Scroll { delta: f32 },
    /// Pointer left the edit surface
    PointerLeft,
    Key(EditorKey),
}

/// What an event changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorResponse {
    pub created: Vec<ObjectHandle>,
    pub destroyed: Vec<ObjectHandle>,
    pub picked: Option<PaletteEntry>,
    /// Transient message for the user, shown once per drag
    pub warning: Option<String>,
    /// The host should not also handle this event (e.g. wheel while sizing)
    pub consumed: bool,
    pub repaint: bool,
}

/// Borrowed host collaborators for one event
pub struct HostContext<'a> {
    pub scene: &'a mut dyn SceneHost,
    pub undo: &'a mut dyn UndoLog,
}

/// Ghost of the object a click would place
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewObject {
    pub entry: PaletteEntry,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Grid overlay parameters for the host renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOverlay {
    pub visible: bool,
    pub color: Vec4,
    pub thickness: f32,
    /// World up-coordinate the overlay is drawn at
    pub height: f32,
}

/// Everything the host needs to draw selection feedback this frame
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub cell: Cell,
    pub object: Option<PreviewObject>,
    pub outline: Option<[Vec3; 8]>,
    pub color: Vec4,
    pub grid: GridOverlay,
}

pub struct EditorSession {
    grid: GridFrame,
    settings: EditorSettings,
    group_brush: GroupBrushSet,
    selection: PaletteSelection,
    palette: Vec<PaletteEntry>,
    tilemap: Tilemap,
    gesture: BrushSizeGesture,
    engine: PlacementEngine,
    /// Cells handled during the current drag
    visited: HashSet<Cell>,
    hovered: Option<Cell>,
    pointer_down: bool,
    /// A soft failure was already reported during this drag
    warned: bool,
    refresh_pending: bool,
    elapsed: f64,
}

impl EditorSession {
    /// Session on `grid` with default settings
    pub fn new(grid: GridFrame, tilemap: Tilemap) -> Self {
        Self::with_engine(grid, tilemap, PlacementEngine::new())
    }

    pub fn with_engine(grid: GridFrame, tilemap: Tilemap, engine: PlacementEngine) -> Self {
        Self {
            grid,
            settings: EditorSettings::default(),
            group_brush: Default::default(),
            selection: PaletteSelection::new(),
            palette: Vec::new(),
            tilemap,
            gesture: BrushSizeGesture::new(),
            engine,
            visited: HashSet::new(),
            hovered: None,
            pointer_down: false,
            warned: false,
            refresh_pending: true,
            elapsed: 0.0,
        }
    }

    /// Open the tool, restoring settings and group brush from `store`.
    /// The palette is scanned on the first `update`.
    pub fn open(grid: GridFrame, tilemap: Tilemap, store: &dyn PreferenceStore) -> Self {
        Self::open_with_engine(grid, tilemap, store, PlacementEngine::new())
    }

    pub fn open_with_engine(grid: GridFrame, tilemap: Tilemap, store: &dyn PreferenceStore, engine: PlacementEngine) -> Self {
        let mut session = Self::with_engine(grid, tilemap, engine);
        session.settings = EditorSettings::load(store);
        session.group_brush = settings::load_group_brush(store);
        log::info!("Editor opened on '{}'", session.tilemap.name());
        session
    }

    /// Persist settings and group brush
    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        self.settings.save(store)?;
        settings::save_group_brush(&self.group_brush, store)
    }

    pub fn grid(&self) -> &GridFrame {
        &self.grid
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    pub fn group_brush(&self) -> &GroupBrushSet {
        &self.group_brush
    }

    pub fn group_brush_mut(&mut self) -> &mut GroupBrushSet {
        &mut self.group_brush
    }

    pub fn selection(&self) -> &PaletteSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut PaletteSelection {
        &mut self.selection
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn tool(&self) -> Tool {
        self.settings.brush.tool
    }

    pub fn brush_extent(&self) -> BrushExtent {
        self.settings.brush.extent
    }

    /// Set the brush size, limited to the configured brush limits
    pub fn set_brush_extent(&mut self, extent: BrushExtent) {
        self.settings.brush.extent = extent.clamped(self.settings.brush_limits);
    }

    /// Cell under the pointer, if any
    pub fn hovered(&self) -> Option<Cell> {
        self.hovered
    }

    /// Seconds of frame time seen by `update`
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.gesture.is_active() || self.settings.brush.tool == tool {
            return;
        }
        log::debug!("Tool {:?} -> {:?}", self.settings.brush.tool, tool);
        self.settings.brush.tool = tool;
        self.end_drag();
    }

    /// Select one palette entry for painting
    pub fn select(&mut self, id: PaletteId) {
        self.selection.select_single(id);
    }

    /// Ask for a palette re-scan on the next `update`
    pub fn request_palette_refresh(&mut self) {
        self.refresh_pending = true;
    }

    /// Per-frame tick. Runs a requested palette re-scan and drops selected
    /// ids that disappeared from the palette.
    pub fn update(&mut self, dt: f32, palette: &mut dyn PaletteSource) {
        self.elapsed += f64::from(dt.max(0.0));
        if !self.refresh_pending {
            return;
        }
        self.refresh_pending = false;

        if let Err(e) = palette.refresh() {
            log::warn!("Palette refresh failed: {}", e);
        }
        self.palette = palette.list_entries(None);

        let known: HashSet<&PaletteId> = self.palette.iter().map(|e| &e.id).collect();
        let before = self.selection.len();
        self.selection.retain(|id| known.contains(id));
        if self.selection.len() != before {
            log::debug!("Dropped {} stale palette selections", before - self.selection.len());
        }
    }

    /// Dispatch one input event
    pub fn handle_event(&mut self, event: &EditorEvent, host: HostContext<'_>) -> EditorResponse {
        let mut response = EditorResponse::default();
        match *event {
            EditorEvent::PointerMoved { ray } => {
                self.hover(&ray, &*host.scene);
                if self.gesture.is_active() {
                    self.update_gesture();
                    response.repaint = true;
                } else if self.pointer_down {
                    self.stroke(host, &mut response);
                }
            }
            EditorEvent::PointerDown { button: PointerButton::Primary, ray, modifiers } => {
                self.hover(&ray, &*host.scene);
                let tool = self.tool();
                if modifiers.ctrl && tool.can_size() {
                    let started = self.hovered.is_some_and(|cell| self.gesture.begin(tool, cell));
                    if started {
                        self.settings.brush.tool = Tool::BrushSizing;
                        self.update_gesture();
                        response.repaint = true;
                    }
                    return response;
                }

                self.pointer_down = true;
                self.warned = false;
                self.visited.clear();
                match tool {
                    Tool::Paint | Tool::Eraser => self.stroke(host, &mut response),
                    Tool::Dropper => self.drop_pick(&*host.scene, &mut response),
                    Tool::None | Tool::BrushSizing => {}
                }
            }
            EditorEvent::PointerDown { .. } => {}
            EditorEvent::PointerUp { button: PointerButton::Primary } => {
                self.finish_gesture();
                self.end_drag();
            }
            EditorEvent::PointerUp { .. } => {}
            EditorEvent::PointerLeft => {
                self.finish_gesture();
                self.end_drag();
                self.hovered = None;
            }
            EditorEvent::Scroll { delta } => {
                if self.gesture.is_active() {
                    self.gesture.scroll(delta, self.settings.brush_limits);
                    self.update_gesture();
                    response.consumed = true;
                    response.repaint = true;
                }
            }
            EditorEvent::Key(key) => self.key(key, &mut response),
        }
        response
    }

    /// Selection feedback for the cell under the pointer
    pub fn preview(&self) -> Option<Preview> {
        let tool = self.tool();
        if !tool.is_active() {
            return None;
        }
        let cell = self.hovered?;
        let builder = SelectionAreaBuilder::new(&self.grid);
        let rotation = self.settings.brush.rotation;

        let (anchor, far) = match self.gesture.corners() {
            Some((pos1, pos2)) => (pos1, pos2),
            None => (cell, self.settings.brush.extent.far_corner(&self.grid, cell)),
        };

        let object = match (tool, self.current_entry()) {
            (Tool::Paint, Some(entry)) if !self.group_brush.enabled => Some(PreviewObject {
                entry,
                position: cell.position() + self.settings.brush.offset,
                rotation: self.grid.up_rotation(rotation),
            }),
            _ => None,
        };

        let color = match tool {
            Tool::Paint => PAINT_COLOR,
            Tool::Eraser => ERASER_COLOR,
            _ => NEUTRAL_COLOR,
        };

        Some(Preview {
            cell,
            object,
            outline: builder.outline(anchor, anchor, far, rotation),
            color,
            grid: self.grid_overlay(),
        })
    }

    pub fn grid_overlay(&self) -> GridOverlay {
        let locator = CellLocator::new(&self.grid, self.settings.locator());
        GridOverlay {
            visible: self.settings.show_grid,
            color: self.settings.grid_color,
            thickness: self.settings.grid_thickness,
            height: locator.floor_height(),
        }
    }

    /// Cells a stamp at `anchor` covers with the current brush
    pub fn selection_cells(&self, anchor: Cell) -> Vec<Cell> {
        let far = self.settings.brush.extent.far_corner(&self.grid, anchor);
        SelectionAreaBuilder::new(&self.grid).build(anchor, anchor, far, self.settings.brush.rotation)
    }

    fn hover(&mut self, ray: &Ray, raycaster: &dyn SceneHost) {
        let locator = CellLocator::new(&self.grid, self.settings.locator());
        self.hovered = locator.resolve(ray, self.tool().surface_pick(), raycaster);
    }

    fn update_gesture(&mut self) {
        if let Some(cell) = self.hovered {
            self.gesture.update(&self.grid, cell, self.settings.brush_limits);
        }
    }

    fn finish_gesture(&mut self) {
        if let Some((tool, extent)) = self.gesture.finish() {
            self.settings.brush.tool = tool;
            self.settings.brush.extent = extent;
        }
    }

    fn end_drag(&mut self) {
        self.pointer_down = false;
        self.warned = false;
        self.visited.clear();
    }

    fn stroke(&mut self, host: HostContext<'_>, response: &mut EditorResponse) {
        let Some(anchor) = self.hovered else {
            return;
        };
        let cells = self.selection_cells(anchor);
        if cells.is_empty() {
            return;
        }

        let tool = self.settings.brush.tool;
        let stamp = if tool == Tool::Paint { self.stamp() } else { None };
        if tool == Tool::Paint && stamp.is_none() {
            if !self.warned {
                self.warned = true;
                log::warn!("Nothing selected in the palette; paint skipped");
                response.warning = Some("Nothing selected in the palette".to_string());
            }
            return;
        }
        let options = PaintOptions {
            rotation: self.settings.brush.rotation,
            offset: self.settings.brush.offset,
            replace: self.settings.replace_mode,
            parent: if self.settings.mechanic_object { Parent::SceneRoot } else { Parent::Tilemap },
            layer_mask: self.settings.brush_layer,
        };

        let HostContext { scene, undo } = host;
        let target = EditTarget {
            scene,
            undo,
            tilemap: &mut self.tilemap,
            visited: &mut self.visited,
        };

        match tool {
            Tool::Paint => {
                response.created = self.engine.paint(target, &self.grid, &cells, stamp.as_ref(), &options);
            }
            Tool::Eraser => {
                response.destroyed = self.engine.erase(target, &self.grid, &cells, options.rotation, options.layer_mask);
            }
            _ => {}
        }
        response.repaint = !response.created.is_empty() || !response.destroyed.is_empty();
    }

    fn drop_pick(&mut self, scene: &dyn SceneHost, response: &mut EditorResponse) {
        let Some(cell) = self.hovered else {
            return;
        };
        // Group painting reads its members, or the multi-selection when it has none
        let into = if !self.group_brush.enabled {
            PickInto::Replace(&mut self.selection)
        } else if self.group_brush.entries.is_empty() {
            PickInto::Add(&mut self.selection)
        } else {
            PickInto::Group(&mut self.group_brush)
        };
        let source = DropperSource { scene, tilemap: &self.tilemap, palette: &self.palette };
        let picked = self.engine.dropper(source, &self.grid, cell, self.settings.brush_layer, into);
        if picked.is_some() {
            self.settings.brush.tool = Tool::Paint;
            response.repaint = true;
        }
        response.picked = picked;
    }

    fn key(&mut self, key: EditorKey, response: &mut EditorResponse) {
        if self.gesture.is_active() {
            return;
        }
        match key {
            EditorKey::Paint => self.set_tool(Tool::Paint),
            EditorKey::Eraser => self.set_tool(Tool::Eraser),
            EditorKey::Dropper => self.set_tool(Tool::Dropper),
            EditorKey::Cancel => self.set_tool(Tool::None),
            EditorKey::Rotate => {
                if self.tool() == Tool::Paint && !self.selection.is_empty() {
                    self.settings.brush.rotate_step();
                    response.repaint = true;
                }
            }
            EditorKey::FloorUp | EditorKey::FloorDown => {
                let manual = self.settings.selection_mode == SelectionMode::Manual;
                if manual && self.tool().is_active() && !self.selection.is_empty() {
                    self.settings.grid_floor += if key == EditorKey::FloorUp { 1 } else { -1 };
                    response.repaint = true;
                }
            }
        }
    }

    /// Entry single painting would place
    fn current_entry(&self) -> Option<PaletteEntry> {
        let id = self.selection.primary()?;
        self.lookup(id)
    }

    fn lookup(&self, id: &PaletteId) -> Option<PaletteEntry> {
        self.palette.iter().find(|e| &e.id == id).cloned()
    }

    /// What a paint stroke stamps with the current selection and group brush
    fn stamp(&self) -> Option<Stamp> {
        if !self.group_brush.enabled {
            return self.current_entry().map(Stamp::Single);
        }

        let (choices, weights): (Vec<PaletteEntry>, Vec<f32>) = if self.group_brush.entries.is_empty() {
            // No configured members: the multi-selection with equal weights
            self.selection.ids().iter().filter_map(|id| self.lookup(id)).map(|e| (e, 1.0)).unzip()
        } else {
            self.group_brush
                .entries
                .iter()
                .map(|g| {
                    let entry = self
                        .lookup(&g.id)
                        .unwrap_or_else(|| PaletteEntry::new(g.id.as_str(), "", g.name.clone()));
                    (entry, g.weight())
                })
                .unzip()
        };

        if choices.is_empty() {
            return None;
        }
        Some(Stamp::Group {
            choices,
            weights,
            density: self.group_brush.density(),
            random_rotation: self.group_brush.random_rotation,
        })
    }
}
