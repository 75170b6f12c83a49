//! Persisted editor settings and the key/value store they live in.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::brush::{BrushLimits, BrushState, GroupBrushSet, normalize_degrees};
use crate::core::error::Error;
use crate::core::types::{Result, Vec2, Vec4};
use crate::grid::{LocatorSettings, SelectionMode};
use crate::host::LayerMask;

/// Preference key of the editor settings blob
pub const SETTINGS_KEY: &str = "gridpaint.settings";
/// Preference key of the group brush blob
pub const GROUP_BRUSH_KEY: &str = "gridpaint.group_brush";

pub const DEFAULT_PALETTE_PATH: &str = "Assets/Prefabs";
pub const MIN_GRID_THICKNESS: f32 = 0.01;
pub const MAX_GRID_THICKNESS: f32 = 0.1;

/// Everything the editor remembers between sessions.
///
/// Absent keys fall back to the defaults below, so blobs written by older
/// versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub selection_mode: SelectionMode,
    /// Planar offset (logical X, Y) added to resolved cells
    pub grid_offset: Vec2,
    /// Manual-mode floor, in cells above the grid origin
    pub grid_floor: i32,
    #[serde(flatten)]
    pub brush: BrushState,
    /// Layers the pointer ray, occupancy and eraser consider
    pub brush_layer: LayerMask,
    pub brush_limits: BrushLimits,
    pub show_grid: bool,
    pub grid_color: Vec4,
    pub grid_thickness: f32,
    /// Folder the palette is scanned from
    pub palette_path: String,
    pub replace_mode: bool,
    /// Place instances at the scene root instead of under the tilemap
    pub mechanic_object: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::Auto,
            grid_offset: Vec2::ZERO,
            grid_floor: 0,
            brush: BrushState::default(),
            brush_layer: LayerMask::ALL,
            brush_limits: BrushLimits::default(),
            show_grid: true,
            grid_color: Vec4::ONE,
            grid_thickness: 0.05,
            palette_path: DEFAULT_PALETTE_PATH.to_string(),
            replace_mode: false,
            mechanic_object: false,
        }
    }
}

impl EditorSettings {
    /// Load from `store`. A missing or unreadable blob gives the defaults.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let mut settings: Self = load_or_default(store, SETTINGS_KEY);
        settings.sanitize();
        settings
    }

    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        store.set(SETTINGS_KEY, serde_json::to_string(self)?)
    }

    /// Restore brush offset, rotation and rotation step
    pub fn reset_brush(&mut self) {
        self.brush.reset();
    }

    pub fn set_grid_thickness(&mut self, thickness: f32) {
        self.grid_thickness = thickness.clamp(MIN_GRID_THICKNESS, MAX_GRID_THICKNESS);
    }

    /// Cell-resolution inputs derived from these settings
    pub fn locator(&self) -> LocatorSettings {
        LocatorSettings {
            mode: self.selection_mode,
            floor: self.grid_floor,
            offset: self.grid_offset,
            anchor: self.brush.anchor,
            layer_mask: self.brush_layer,
        }
    }

    fn sanitize(&mut self) {
        self.set_grid_thickness(self.grid_thickness);
        self.brush.rotation_step = self.brush.rotation_step.clamp(-360.0, 360.0);
        self.brush.rotation = normalize_degrees(self.brush.rotation);
        self.brush_limits = BrushLimits::new(self.brush_limits.0.x, self.brush_limits.0.y, self.brush_limits.0.z);
    }
}

/// Load the group brush from `store`, falling back to an empty set
pub fn load_group_brush(store: &dyn PreferenceStore) -> GroupBrushSet {
    let mut set: GroupBrushSet = load_or_default(store, GROUP_BRUSH_KEY);
    set.sanitize();
    set
}

pub fn save_group_brush(set: &GroupBrushSet, store: &mut dyn PreferenceStore) -> Result<()> {
    store.set(GROUP_BRUSH_KEY, serde_json::to_string(set)?)
}

/// Remove both persisted blobs
pub fn clear_persisted(store: &mut dyn PreferenceStore) -> Result<()> {
    store.remove(SETTINGS_KEY)?;
    store.remove(GROUP_BRUSH_KEY)?;
    log::info!("Cleared persisted editor data");
    Ok(())
}

fn load_or_default<T: DeserializeOwned + Default>(store: &dyn PreferenceStore, key: &str) -> T {
    let Some(blob) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&blob) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring unreadable preference {}: {}", key, e);
            T::default()
        }
    }
}

/// Host key/value preference store
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Preferences held in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Preferences kept in one JSON object on disk, written on every change
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFilePreferences {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            return Err(Error::Settings(format!("{} is a directory", path.display())));
        }
        let values = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
