//! Editor session: persisted settings and the interactive tool state machine.

pub mod settings;
pub mod editor;

pub use settings::{
    EditorSettings, GROUP_BRUSH_KEY, JsonFilePreferences, MemoryPreferences, PreferenceStore, SETTINGS_KEY,
    clear_persisted, load_group_brush, save_group_brush,
};
pub use editor::{
    EditorEvent, EditorKey, EditorResponse, EditorSession, GridOverlay, HostContext, Modifiers, PointerButton, Preview,
    PreviewObject,
};
