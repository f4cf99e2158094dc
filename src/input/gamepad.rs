//! Gamepad polling
//!
//! Native: gilrs. WASM: no gamepad support, every query reads as released.

use crate::math::Vec2;

// Button bit indices in the polled mask
pub mod button {
    pub const SOUTH: u32 = 0;       // Cross / A
    pub const EAST: u32 = 1;        // Circle / B
    pub const START: u32 = 2;
    pub const DPAD_UP: u32 = 3;
    pub const DPAD_DOWN: u32 = 4;
    pub const DPAD_LEFT: u32 = 5;
    pub const DPAD_RIGHT: u32 = 6;
}

/// Button state of the current and previous poll
#[derive(Debug, Clone, Copy, Default)]
struct ButtonMasks {
    current: u32,
    previous: u32,
}

impl ButtonMasks {
    fn advance(&mut self, current: u32) {
        self.previous = self.current;
        self.current = current;
    }

    fn is_down(&self, button: u32) -> bool {
        self.current & (1 << button) != 0
    }

    fn is_pressed(&self, button: u32) -> bool {
        self.is_down(button) && self.previous & (1 << button) == 0
    }
}

// ============================================================================
// Native Implementation (gilrs)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    use super::*;
    use gilrs::{Axis, Button as GilrsButton, Gilrs};

    pub struct Gamepad {
        gilrs: Option<Gilrs>,
        deadzone: f32,
        masks: ButtonMasks,
    }

    impl Gamepad {
        pub fn new() -> Self {
            let gilrs = match Gilrs::new() {
                Ok(gilrs) => Some(gilrs),
                Err(e) => {
                    log::warn!("Gamepad support unavailable: {}", e);
                    None
                }
            };
            Self {
                gilrs,
                deadzone: 0.15,
                masks: ButtonMasks::default(),
            }
        }

        /// Call once per frame before querying buttons
        pub fn poll(&mut self) {
            if let Some(gilrs) = self.gilrs.as_mut() {
                // Events are processed internally by gilrs
                while gilrs.next_event().is_some() {}
            }
            let mask = self.button_mask();
            self.masks.advance(mask);
        }

        pub fn has_gamepad(&self) -> bool {
            self.active_gamepad().is_some()
        }

        fn active_gamepad(&self) -> Option<gilrs::Gamepad<'_>> {
            self.gilrs.as_ref()?.gamepads().next().map(|(_, gp)| gp)
        }

        fn button_mask(&self) -> u32 {
            let Some(gp) = self.active_gamepad() else { return 0 };
            let mut mask = 0u32;

            if gp.is_pressed(GilrsButton::South) { mask |= 1 << button::SOUTH; }
            if gp.is_pressed(GilrsButton::East) { mask |= 1 << button::EAST; }
            if gp.is_pressed(GilrsButton::Start) { mask |= 1 << button::START; }
            if gp.is_pressed(GilrsButton::DPadUp) { mask |= 1 << button::DPAD_UP; }
            if gp.is_pressed(GilrsButton::DPadDown) { mask |= 1 << button::DPAD_DOWN; }
            if gp.is_pressed(GilrsButton::DPadLeft) { mask |= 1 << button::DPAD_LEFT; }
            if gp.is_pressed(GilrsButton::DPadRight) { mask |= 1 << button::DPAD_RIGHT; }

            mask
        }

        pub fn is_button_down(&self, button: u32) -> bool {
            self.masks.is_down(button)
        }

        pub fn is_button_pressed(&self, button: u32) -> bool {
            self.masks.is_pressed(button)
        }

        pub fn left_stick(&self) -> Vec2 {
            let Some(gp) = self.active_gamepad() else { return Vec2::ZERO };
            let x = gp.value(Axis::LeftStickX);
            let y = gp.value(Axis::LeftStickY);
            apply_deadzone(x, y, self.deadzone)
        }
    }
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod platform {
    use super::*;

    pub struct Gamepad {
        masks: ButtonMasks,
    }

    impl Gamepad {
        pub fn new() -> Self {
            Self { masks: ButtonMasks::default() }
        }

        pub fn poll(&mut self) {}

        pub fn has_gamepad(&self) -> bool {
            false
        }

        pub fn is_button_down(&self, button: u32) -> bool {
            self.masks.is_down(button)
        }

        pub fn is_button_pressed(&self, button: u32) -> bool {
            self.masks.is_pressed(button)
        }

        pub fn left_stick(&self) -> Vec2 {
            Vec2::ZERO
        }
    }
}

impl Default for Gamepad {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Shared utilities
// ============================================================================

/// Apply radial deadzone with linear rescaling
pub fn apply_deadzone(x: f32, y: f32, deadzone: f32) -> Vec2 {
    let len = (x * x + y * y).sqrt();
    if len < deadzone {
        return Vec2::ZERO;
    }
    // Rescale from deadzone..1.0 to 0.0..1.0
    let scale = (len - deadzone) / (1.0 - deadzone) / len;
    Vec2::new(x * scale, y * scale)
}

// Re-export the platform-specific implementation
pub use platform::Gamepad;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_only_on_first_poll() {
        let mut masks = ButtonMasks::default();
        masks.advance(1 << button::SOUTH);
        assert!(masks.is_pressed(button::SOUTH));

        masks.advance(1 << button::SOUTH);
        assert!(masks.is_down(button::SOUTH));
        assert!(!masks.is_pressed(button::SOUTH));
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(apply_deadzone(0.1, 0.0, 0.15), Vec2::ZERO);
        let v = apply_deadzone(1.0, 0.0, 0.15);
        assert!((v.x - 1.0).abs() < 1e-6);
    }
}
