//! Player input
//!
//! Game code asks an `InputSource` about `InputAction`s and never sees keys
//! or buttons. `InputState` is the live source: macroquad keyboard plus a
//! gilrs gamepad on native targets, keyboard only on WASM.

mod actions;
mod gamepad;
mod state;

pub use actions::*;
pub use gamepad::Gamepad;
pub use state::InputState;

#[cfg(test)]
pub(crate) use actions::testing;
