//! Input state management
//!
//! Polls both keyboard (macroquad) and gamepad (gilrs), combining them into
//! the action-based `InputSource` API. A connected gamepad takes over the
//! menu actions; the keyboard stays live for the editor.

use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};

use super::gamepad::{button, Gamepad};
use super::{InputAction, InputSource};
use crate::math::Vec3;

/// Unified input state that handles both keyboard and gamepad
pub struct InputState {
    gamepad: Gamepad,
}

impl InputState {
    pub fn new() -> Self {
        Self { gamepad: Gamepad::new() }
    }

    /// Call once per frame before checking actions
    pub fn poll(&mut self) {
        self.gamepad.poll();
    }

    pub fn has_gamepad(&self) -> bool {
        self.gamepad.has_gamepad()
    }

    fn shift_down() -> bool {
        is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift)
    }

    fn keyboard_pressed(&self, action: InputAction) -> bool {
        match action {
            InputAction::Accept => is_key_pressed(KeyCode::Enter),
            InputAction::Pause => is_key_pressed(KeyCode::P),
            InputAction::NavigateUp => is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W),
            InputAction::NavigateDown => is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S),
            InputAction::NavigateLeft => is_key_pressed(KeyCode::Left),
            InputAction::NavigateRight => is_key_pressed(KeyCode::Right),
            InputAction::Quit => is_key_pressed(KeyCode::Escape),

            InputAction::ToggleEditor => is_key_pressed(KeyCode::F1),
            InputAction::CursorForward => is_key_pressed(KeyCode::Up),
            InputAction::CursorBack => is_key_pressed(KeyCode::Down),
            InputAction::CursorRight => is_key_pressed(KeyCode::Right),
            InputAction::CursorLeft => is_key_pressed(KeyCode::Left),
            InputAction::PlaceRoad => Self::shift_down() && is_key_pressed(KeyCode::Key1),
            InputAction::PlacePavement => Self::shift_down() && is_key_pressed(KeyCode::Key2),
            InputAction::PlaceTunnel => Self::shift_down() && is_key_pressed(KeyCode::Key3),
            InputAction::RemoveTile => is_key_pressed(KeyCode::Delete),
            InputAction::SaveLevel => is_key_pressed(KeyCode::F2),
            InputAction::ResetLevel => is_key_pressed(KeyCode::F3),
        }
    }

    fn keyboard_down(&self, action: InputAction) -> bool {
        match action {
            InputAction::Accept => is_key_down(KeyCode::Enter),
            InputAction::Pause => is_key_down(KeyCode::P),
            InputAction::NavigateUp => is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            InputAction::NavigateDown => is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            InputAction::NavigateLeft => is_key_down(KeyCode::Left),
            InputAction::NavigateRight => is_key_down(KeyCode::Right),
            InputAction::Quit => is_key_down(KeyCode::Escape),
            // Editor actions are edge-triggered only
            _ => self.keyboard_pressed(action),
        }
    }

    fn gamepad_button(action: InputAction) -> Option<u32> {
        match action {
            InputAction::Accept => Some(button::SOUTH),
            InputAction::Pause => Some(button::START),
            InputAction::NavigateUp => Some(button::DPAD_UP),
            InputAction::NavigateDown => Some(button::DPAD_DOWN),
            InputAction::NavigateLeft => Some(button::DPAD_LEFT),
            InputAction::NavigateRight => Some(button::DPAD_RIGHT),
            _ => None,
        }
    }

    fn keyboard_movement() -> Vec3 {
        let mut velocity = Vec3::ZERO;

        if is_key_down(KeyCode::W) {
            velocity.x = 1.0;
        } else if is_key_down(KeyCode::S) {
            velocity.x = -1.0;
        }

        if is_key_down(KeyCode::A) {
            velocity.z = -1.0;
        } else if is_key_down(KeyCode::D) {
            velocity.z = 1.0;
        }

        velocity
    }
}

impl InputSource for InputState {
    fn action_pressed(&self, action: InputAction) -> bool {
        match Self::gamepad_button(action) {
            Some(b) if self.gamepad.has_gamepad() => self.gamepad.is_button_pressed(b),
            _ => self.keyboard_pressed(action),
        }
    }

    fn action_down(&self, action: InputAction) -> bool {
        match Self::gamepad_button(action) {
            Some(b) if self.gamepad.has_gamepad() => self.gamepad.is_button_down(b),
            _ => self.keyboard_down(action),
        }
    }

    fn movement(&self) -> Vec3 {
        if self.gamepad.has_gamepad() {
            let stick = self.gamepad.left_stick();
            return Vec3::new(stick.y, 0.0, stick.x);
        }
        Self::keyboard_movement()
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
