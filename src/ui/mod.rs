//! Screen-space UI: anchored texts and option menus
//!
//! Retained, not immediate: menus are built once when a state is created and
//! only their colors and strings change afterwards.

mod layout;
mod text;

pub use layout::UILayout;
pub use text::{compute_position, TextAnimation, UIAnchor, UIText};
