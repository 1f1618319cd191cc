//! Keyboard and mouse input.
//!
//! Input flows through three stages:
//!
//! - [`InputCollector`] receives winit events as they arrive.
//! - Once per frame it produces an [`InputSnapshot`] of what is held right now.
//! - [`InputState`] keeps the current and previous snapshot so that presses and
//!   releases can be detected by comparing the two.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::PhysicalKey;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Keys and buttons held at one instant, plus mouse motion since the last one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    keys_down: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
}

impl InputSnapshot {
    /// Nothing held, no motion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a held key.
    pub fn with_key(mut self, key: KeyCode) -> Self {
        self.keys_down.insert(key);
        self
    }

    /// Add a held mouse button.
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.mouse_buttons_down.insert(button);
        self
    }

    /// Set the mouse motion for this snapshot.
    pub fn with_mouse_delta(mut self, delta: Vec2) -> Self {
        self.mouse_delta = delta;
        self
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }
}

/// Accumulates window events between frames.
#[derive(Debug, Default)]
pub struct InputCollector {
    keys_down: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press_button(*button),
                ElementState::Released => self.release_button(*button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                // The first position only establishes a baseline.
                if let Some(old_pos) = self.mouse_position {
                    self.move_mouse(new_pos - old_pos);
                }
                self.mouse_position = Some(new_pos);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::Focused(false) => {
                // Releases are not delivered to an unfocused window.
                self.keys_down.clear();
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    pub fn press_button(&mut self, button: MouseButton) {
        self.mouse_buttons_down.insert(button);
    }

    pub fn release_button(&mut self, button: MouseButton) {
        self.mouse_buttons_down.remove(&button);
    }

    /// Add relative mouse motion, in pixels.
    pub fn move_mouse(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    /// Capture the current state and reset the accumulated mouse motion.
    pub fn snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            keys_down: self.keys_down.clone(),
            mouse_buttons_down: self.mouse_buttons_down.clone(),
            mouse_position: self.mouse_position.unwrap_or(Vec2::ZERO),
            mouse_delta: std::mem::take(&mut self.mouse_delta),
        }
    }
}

/// The input a frame is processed with: this frame's snapshot and the last one.
///
/// Before the first [`refresh`](Self::refresh) both snapshots are empty, so
/// nothing is down and every key is up.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    current: InputSnapshot,
    previous: InputSnapshot,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `snapshot` current and keep the old current one for edge detection.
    pub fn refresh(&mut self, snapshot: InputSnapshot) {
        self.previous = std::mem::replace(&mut self.current, snapshot);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.current.is_key_down(key)
    }

    /// Returns true if the key is not held.
    pub fn key_up(&self, key: KeyCode) -> bool {
        !self.current.is_key_down(key)
    }

    /// Returns true if the key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.current.is_key_down(key) && !self.previous.is_key_down(key)
    }

    /// Returns true if the key came up this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        !self.current.is_key_down(key) && self.previous.is_key_down(key)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.current.is_button_down(button)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.current.is_button_down(button) && !self.previous.is_button_down(button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        !self.current.is_button_down(button) && self.previous.is_button_down(button)
    }

    /// Mouse movement since the previous snapshot.
    pub fn mouse_delta(&self) -> Vec2 {
        self.current.mouse_delta()
    }

    /// Last known cursor position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.current.mouse_position()
    }

    pub fn current(&self) -> &InputSnapshot {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_everything_up() {
        let input = InputState::new();
        assert!(input.key_up(KeyCode::KeyA));
        assert!(!input.key_down(KeyCode::KeyA));
        assert!(!input.key_pressed(KeyCode::KeyA));
        assert!(!input.mouse_down(MouseButton::Left));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn key_edges_follow_snapshots() {
        let mut input = InputState::new();

        input.refresh(InputSnapshot::new().with_key(KeyCode::KeyD));
        assert!(input.key_down(KeyCode::KeyD));
        assert!(input.key_pressed(KeyCode::KeyD));
        assert!(!input.key_released(KeyCode::KeyD));

        input.refresh(InputSnapshot::new().with_key(KeyCode::KeyD));
        assert!(input.key_down(KeyCode::KeyD));
        assert!(!input.key_pressed(KeyCode::KeyD));

        input.refresh(InputSnapshot::new());
        assert!(input.key_up(KeyCode::KeyD));
        assert!(input.key_released(KeyCode::KeyD));

        input.refresh(InputSnapshot::new());
        assert!(!input.key_released(KeyCode::KeyD));
    }

    #[test]
    fn mouse_button_edges_follow_snapshots() {
        let mut input = InputState::new();
        input.refresh(InputSnapshot::new().with_button(MouseButton::Left));
        assert!(input.mouse_pressed(MouseButton::Left));
        input.refresh(InputSnapshot::new());
        assert!(input.mouse_released(MouseButton::Left));
        assert!(!input.mouse_down(MouseButton::Left));
    }

    #[test]
    fn collector_snapshot_resets_motion_but_keeps_keys() {
        let mut collector = InputCollector::new();
        collector.press_key(KeyCode::KeyA);
        collector.move_mouse(Vec2::new(3.0, -1.0));
        collector.move_mouse(Vec2::new(1.0, 1.0));

        let first = collector.snapshot();
        assert!(first.is_key_down(KeyCode::KeyA));
        assert_eq!(first.mouse_delta(), Vec2::new(4.0, 0.0));

        let second = collector.snapshot();
        assert!(second.is_key_down(KeyCode::KeyA));
        assert_eq!(second.mouse_delta(), Vec2::ZERO);

        collector.release_key(KeyCode::KeyA);
        assert!(!collector.snapshot().is_key_down(KeyCode::KeyA));
    }
}
