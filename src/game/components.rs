//! Entity kinds and per-type tables
//!
//! An entity is a thin record around a physics body: the body owns the
//! position, rotation and velocity, the entity owns the gameplay flags.
//! Behavior lives in the factory and the managers.

use crate::audio::SoundType;
use crate::math::{AxisAngle, Vec3};
use crate::physics::{BodyHandle, ColliderHandle};
use crate::resources::ResourceType;
use crate::world::{PointType, TileType, VehicleType};

/// Edge length of a tile on the XZ plane
pub const TILE_SIZE: f32 = 8.0;

/// Acceleration given to vehicles added without an explicit one
pub const DEFAULT_ACCELERATION: f32 = 30.0;

// =============================================================================
// Kind tags
// =============================================================================

/// Numeric tags the level tools print for each kind
pub mod tags {
    pub const PLAYER: u16 = 0x20;
    pub const VEHICLE: u16 = 0x40;
    pub const TILE: u16 = 0x60;
    pub const COIN: u16 = 0x160;
    pub const OBJECT: u16 = 0x180;
}

/// What an entity is, plus the data only that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player(PlayerData),
    Vehicle(VehicleData),
    Tile(TileData),
    Point(PointType),
    Coin,
    /// Scenery with a body but no gameplay rules
    Object,
}

impl EntityKind {
    pub fn tag(&self) -> u16 {
        match self {
            EntityKind::Player(_) => tags::PLAYER,
            EntityKind::Vehicle(_) => tags::VEHICLE,
            EntityKind::Tile(_) => tags::TILE,
            EntityKind::Point(point) => *point as u16,
            EntityKind::Coin => tags::COIN,
            EntityKind::Object => tags::OBJECT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player(_) => "player",
            EntityKind::Vehicle(_) => "vehicle",
            EntityKind::Tile(_) => "tile",
            EntityKind::Point(point) => point.name(),
            EntityKind::Coin => "coin",
            EntityKind::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerData {
    /// Footstep loop for the ground currently under the player
    pub footstep: Option<SoundType>,
    pub can_move: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleData {
    pub vehicle_type: VehicleType,
    pub acceleration: f32,
    /// Only the sign of each component matters
    pub direction: Vec3,
    /// Rotation the vehicle was created with, restored on reactivation
    pub initial_rotation: AxisAngle,
}

impl VehicleData {
    pub fn velocity(&self) -> Vec3 {
        self.direction * self.acceleration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileData {
    pub tile_type: TileType,
}

// =============================================================================
// Entity
// =============================================================================

/// Runtime entity. The physics body is owned by the physics world; whoever
/// removes the entity must destroy the body too.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub is_active: bool,
    pub start_pos: Vec3,
    pub body: BodyHandle,
    pub collider: ColliderHandle,
}

impl Entity {
    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn is_vehicle(&self) -> bool {
        matches!(self.kind, EntityKind::Vehicle(_))
    }

    pub fn player(&self) -> Option<&PlayerData> {
        match &self.kind {
            EntityKind::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            EntityKind::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn vehicle(&self) -> Option<&VehicleData> {
        match &self.kind {
            EntityKind::Vehicle(data) => Some(data),
            _ => None,
        }
    }

    pub fn vehicle_mut(&mut self) -> Option<&mut VehicleData> {
        match &mut self.kind {
            EntityKind::Vehicle(data) => Some(data),
            _ => None,
        }
    }

    pub fn tile(&self) -> Option<&TileData> {
        match &self.kind {
            EntityKind::Tile(data) => Some(data),
            _ => None,
        }
    }

    pub fn point_type(&self) -> Option<PointType> {
        match self.kind {
            EntityKind::Point(point) => Some(point),
            _ => None,
        }
    }
}

// =============================================================================
// Per-type tables
// =============================================================================

/// Collider size, collider offset and render data for one vehicle type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSpec {
    pub extents: Vec3,
    pub collider_offset: Vec3,
    pub model: ResourceType,
    pub model_scale: f32,
}

pub fn vehicle_spec(vehicle_type: VehicleType) -> VehicleSpec {
    match vehicle_type {
        VehicleType::Car => VehicleSpec {
            extents: Vec3::new(6.0, 4.9, 9.7),
            collider_offset: Vec3::new(0.0, 2.5, 0.0),
            model: ResourceType::CarModel,
            model_scale: 4.0,
        },
        // Truck has no tuned collider yet
        VehicleType::Truck => VehicleSpec {
            extents: Vec3::ONE,
            collider_offset: Vec3::ZERO,
            model: ResourceType::TruckModel,
            model_scale: 4.0,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpec {
    pub extents: Vec3,
    /// Added to the cursor position when the tile is placed in the editor
    pub place_offset: Vec3,
    pub footstep: Option<SoundType>,
}

pub fn tile_spec(tile_type: TileType) -> TileSpec {
    let extents = Vec3::new(TILE_SIZE, 1.0, TILE_SIZE);
    match tile_type {
        TileType::Road => TileSpec {
            extents,
            place_offset: Vec3::ZERO,
            footstep: Some(SoundType::TileRoad),
        },
        // Raised slightly above the road surface
        TileType::Pavement => TileSpec {
            extents,
            place_offset: Vec3::new(0.0, 0.3, 0.0),
            footstep: Some(SoundType::TilePavement),
        },
        TileType::Tunnel => TileSpec {
            extents,
            place_offset: Vec3::ZERO,
            footstep: Some(SoundType::TileRoad),
        },
    }
}

/// Coin collider, relative to a body at the coin position
pub mod coin {
    use crate::math::Vec3;

    pub const EXTENTS: Vec3 = Vec3::new(1.4, 0.5, 4.0);
    pub const COLLIDER_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 1.6);
    pub const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const ROTATION_ANGLE: f32 = 4.7;
    pub const SPIN: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const MODEL_SCALE: f32 = 0.02;
}

pub const PLAYER_EXTENTS: Vec3 = Vec3::ONE;
