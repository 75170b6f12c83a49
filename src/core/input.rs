//! Input state tracking and translation of winit events into editor events

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::core::types::Vec2;
use crate::math::Ray;
use crate::session::{EditorEvent, EditorKey, Modifiers, PointerButton};

/// Editor shortcut bound to a physical key
pub fn editor_key(key: KeyCode) -> Option<EditorKey> {
    match key {
        KeyCode::KeyB => Some(EditorKey::Paint),
        KeyCode::KeyE => Some(EditorKey::Eraser),
        KeyCode::KeyI => Some(EditorKey::Dropper),
        KeyCode::KeyR => Some(EditorKey::Rotate),
        KeyCode::ArrowUp => Some(EditorKey::FloorUp),
        KeyCode::ArrowDown => Some(EditorKey::FloorDown),
        KeyCode::Escape => Some(EditorKey::Cancel),
        _ => None,
    }
}

/// Tracks keyboard and mouse state for one window
pub struct InputState {
    /// Currently pressed keys
    keys_pressed: HashSet<KeyCode>,
    /// Current mouse position in window pixels
    mouse_position: Vec2,
    /// Currently pressed mouse buttons
    mouse_buttons: HashSet<MouseButton>,
    modifiers: Modifiers,
}

impl InputState {
    /// Create new input state
    pub fn new() -> Self {
        Self {
            keys_pressed: HashSet::new(),
            mouse_position: Vec2::ZERO,
            mouse_buttons: HashSet::new(),
            modifiers: Modifiers::default(),
        }
    }

    /// Update state from a window event and return the editor event it maps
    /// to, if any. `ray_at` turns a window pixel into a world ray.
    pub fn process_event(&mut self, event: &WindowEvent, ray_at: impl Fn(Vec2) -> Ray) -> Option<EditorEvent> {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(key_code),
                    state,
                    repeat,
                    ..
                },
                ..
            } => self.on_key(*key_code, *state == ElementState::Pressed, *repeat),
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = Modifiers {
                    ctrl: state.control_key(),
                    shift: state.shift_key(),
                    alt: state.alt_key(),
                };
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.on_cursor(Vec2::new(position.x as f32, position.y as f32), ray_at))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_button(*button, *state == ElementState::Pressed, ray_at)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                self.on_wheel(lines)
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_buttons.clear();
                Some(EditorEvent::PointerLeft)
            }
            _ => None,
        }
    }

    fn on_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<EditorEvent> {
        if !pressed {
            self.keys_pressed.remove(&key);
            return None;
        }
        self.keys_pressed.insert(key);
        if repeat {
            return None;
        }
        editor_key(key).map(EditorEvent::Key)
    }

    fn on_cursor(&mut self, position: Vec2, ray_at: impl Fn(Vec2) -> Ray) -> EditorEvent {
        self.mouse_position = position;
        EditorEvent::PointerMoved { ray: ray_at(position) }
    }

    fn on_button(&mut self, button: MouseButton, pressed: bool, ray_at: impl Fn(Vec2) -> Ray) -> Option<EditorEvent> {
        let button_kind = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => return None,
        };

        if pressed {
            self.mouse_buttons.insert(button);
            Some(EditorEvent::PointerDown {
                button: button_kind,
                ray: ray_at(self.mouse_position),
                modifiers: self.modifiers,
            })
        } else {
            self.mouse_buttons.remove(&button);
            Some(EditorEvent::PointerUp { button: button_kind })
        }
    }

    /// winit reports wheel-up as positive; editor scroll deltas are positive
    /// when scrolling down
    fn on_wheel(&mut self, lines: f32) -> Option<EditorEvent> {
        (lines != 0.0).then_some(EditorEvent::Scroll { delta: -lines })
    }

    /// Check if key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Get current mouse position
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Check if mouse button is pressed
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
