//! Crossing The Line
//!
//! A 3D road-crossing game: the `.nklvl` level format, the entity simulation
//! on top of a physics collaborator, and the menu/hub/level game flow.
//! Rendering, audio and input devices sit behind traits; `backend` holds the
//! macroquad implementations the binary uses.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod audio;
pub mod backend;
pub mod config;
pub mod dialogue;
pub mod game;
pub mod input;
pub mod math;
pub mod physics;
pub mod render;
pub mod resources;
pub mod state;
pub mod ui;
pub mod world;

pub use app::App;
pub use config::GameConfig;
