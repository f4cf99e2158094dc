//! Game action definitions
//!
//! Menus and the level only ever ask about actions, never about keys.

use crate::math::Vec3;

/// Everything the player or the level editor can trigger
///
/// Default bindings (keyboard / gamepad):
/// - Accept = Enter / South (Cross)
/// - Pause = P / Start
/// - NavigateUp = Up or W / DPad up
/// - NavigateDown = Down or S / DPad down
/// - NavigateLeft, NavigateRight = Left, Right / DPad left, right
/// - Quit = Escape
///
/// Editor bindings are keyboard only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Accept,
    Pause,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    Quit,

    // Editor
    ToggleEditor,   // F1
    CursorForward,  // Up
    CursorBack,     // Down
    CursorRight,    // Right
    CursorLeft,     // Left
    PlaceRoad,      // Shift+1
    PlacePavement,  // Shift+2
    PlaceTunnel,    // Shift+3
    RemoveTile,     // Delete
    SaveLevel,      // F2
    ResetLevel,     // F3
}

/// Polled input, one snapshot per frame
pub trait InputSource {
    /// True only on the frame the action started
    fn action_pressed(&self, action: InputAction) -> bool;
    /// True while the action is held
    fn action_down(&self, action: InputAction) -> bool;
    /// Camera-relative movement: x forward/back, z right/left, each in [-1, 1]
    fn movement(&self) -> Vec3;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Input with a fixed set of pressed and held actions
    #[derive(Default)]
    pub struct ScriptedInput {
        pub pressed: Vec<InputAction>,
        pub down: Vec<InputAction>,
        pub movement: Vec3,
    }

    impl ScriptedInput {
        pub fn pressing(actions: &[InputAction]) -> Self {
            Self {
                pressed: actions.to_vec(),
                ..Default::default()
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn action_pressed(&self, action: InputAction) -> bool {
            self.pressed.contains(&action)
        }

        fn action_down(&self, action: InputAction) -> bool {
            self.down.contains(&action) || self.pressed.contains(&action)
        }

        fn movement(&self) -> Vec3 {
            self.movement
        }
    }
}
