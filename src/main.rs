//! Headless gridpaint driver.
//!
//! Opens an editor session on an ECS scene, replays a short scripted stroke
//! sequence and saves the settings back.
//!
//! Usage: cargo run -- [OPTIONS]
//!
//! Options:
//!   --palette <DIR>   Palette root with one sub-folder per group
//!                     (default: built-in demo palette)
//!   --prefs <FILE>    Preference file (default: gridpaint_prefs.json)
//!   --seed <SEED>     Scatter seed (default: 12345)

use std::path::PathBuf;

use gridpaint::core::logging;
use gridpaint::core::types::{Result, Vec3};
use gridpaint::edit::{PlacementEngine, Tilemap, UndoRecorder};
use gridpaint::grid::{AxisSwizzle, GridFrame};
use gridpaint::host::EcsScene;
use gridpaint::math::{Aabb, Ray};
use gridpaint::palette::{DirectoryPalette, PaletteEntry, PaletteSource, StaticPalette};
use gridpaint::session::{
    EditorEvent, EditorKey, EditorSession, HostContext, JsonFilePreferences, Modifiers, PointerButton,
};

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("gridpaint failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let prefs_path = parse_str_arg(args, "--prefs")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("gridpaint_prefs.json"));
    let seed = parse_u64_arg(args, "--seed").unwrap_or(12345);

    let mut palette: Box<dyn PaletteSource> = match parse_str_arg(args, "--palette") {
        Some(dir) => Box::new(DirectoryPalette::new(dir)),
        None => Box::new(demo_palette()),
    };

    let mut prefs = JsonFilePreferences::open(&prefs_path)?;
    let grid = GridFrame::unit(AxisSwizzle::Xzy);

    let mut scene = EcsScene::new(grid.up_vector());
    scene.spawn_static(Aabb::new(Vec3::new(-16.0, -1.0, -16.0), Vec3::new(16.0, 0.0, 16.0)), 0);
    let mut undo = UndoRecorder::new();

    let mut session = EditorSession::open_with_engine(grid, Tilemap::new("Demo"), &prefs, PlacementEngine::seeded(seed));
    session.update(0.0, palette.as_mut());

    let Some(first) = session.palette().first().map(|e| e.id.clone()) else {
        log::warn!("Palette is empty; nothing to paint");
        return Ok(());
    };
    log::info!("Palette has {} entries in {} groups", session.palette().len(), palette.folders().len());

    session.select(first);
    let script = [
        EditorEvent::Key(EditorKey::Paint),
        press(0.2, 0.2, false),
        moved(1.2, 0.2),
        moved(2.2, 0.2),
        release(),
        EditorEvent::Key(EditorKey::Rotate),
        press(4.2, 4.2, true),
        moved(6.2, 6.2),
        release(),
        press(4.2, -4.2, false),
        release(),
        EditorEvent::Key(EditorKey::Eraser),
        press(1.2, 0.2, false),
        release(),
    ];

    for (frame, event) in script.iter().enumerate() {
        let response = session.handle_event(event, HostContext { scene: &mut scene, undo: &mut undo });
        if !response.created.is_empty() || !response.destroyed.is_empty() {
            log::info!(
                "frame {}: {:?} created {} destroyed {}",
                frame,
                session.tool(),
                response.created.len(),
                response.destroyed.len()
            );
        }
        session.update(1.0 / 60.0, palette.as_mut());
    }

    log::info!(
        "Done: {} objects on '{}', {} undo steps, brush {:?}",
        session.tilemap().len(),
        session.tilemap().name(),
        undo.groups().len(),
        session.brush_extent().counts()
    );

    session.save(&mut prefs)?;
    log::info!("Settings saved to {}", prefs.path().display());
    Ok(())
}

fn demo_palette() -> StaticPalette {
    StaticPalette::new(vec![
        PaletteEntry::new("Props/crate.prefab", "Props", "crate"),
        PaletteEntry::new("Props/barrel.prefab", "Props", "barrel"),
        PaletteEntry::new("Ground/grass.prefab", "Ground", "grass"),
    ])
}

fn ray_at(x: f32, z: f32) -> Ray {
    Ray::new(Vec3::new(x, 20.0, z), Vec3::NEG_Y)
}

fn press(x: f32, z: f32, ctrl: bool) -> EditorEvent {
    EditorEvent::PointerDown {
        button: PointerButton::Primary,
        ray: ray_at(x, z),
        modifiers: Modifiers { ctrl, ..Default::default() },
    }
}

fn moved(x: f32, z: f32) -> EditorEvent {
    EditorEvent::PointerMoved { ray: ray_at(x, z) }
}

fn release() -> EditorEvent {
    EditorEvent::PointerUp { button: PointerButton::Primary }
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}
