//! Gameplay
//!
//! Entities live in generational arenas owned by their managers. Physics
//! bodies point back at entities through their user data, and contacts are
//! turned into `GameEvent`s that the app routes once per frame.

pub mod camera;
pub mod components;
pub mod entity;
pub mod entity_manager;
pub mod event;
pub mod factory;
pub mod level;
pub mod level_manager;
pub mod tile_manager;

pub use camera::Camera;
pub use components::{Entity, EntityKind};
pub use entity::{EntityArena, EntityId};
pub use entity_manager::EntityManager;
pub use event::{EventBus, EventQueue, GameEvent, GameEventKind};
pub use level::Level;
pub use level_manager::{LevelGroup, LevelManager, Transition, LEVEL_GROUPS_MAX};
pub use tile_manager::TileManager;
