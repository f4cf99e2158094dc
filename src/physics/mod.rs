//! Physics collaborator
//!
//! The gameplay code never owns physics state directly. It asks a `Physics`
//! implementation for bodies and colliders and keeps the returned handles.
//! Contacts come back from `step` as a list of begin/end transitions.
//!
//! Stale handles (bodies already destroyed) read back as defaults and writes
//! through them are ignored.

mod box_world;

pub use box_world::BoxWorld;

use crate::game::EntityId;
use crate::math::{AxisAngle, Vec3};

/// Handle to a physics body. Generational, so a destroyed body's handle
/// never aliases a newer body in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Handle to a collider attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle {
    pub(crate) body: BodyHandle,
    pub(crate) slot: u32,
}

impl ColliderHandle {
    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// Never moved by integration
    #[default]
    Static,
    /// Moved by velocity and gravity
    Dynamic,
    /// Moved by velocity only, positioned by gameplay code
    Kinematic,
}

#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub position: Vec3,
    pub kind: BodyKind,
    pub user_data: Option<EntityId>,
}

#[derive(Debug, Clone, Copy)]
pub struct ColliderDesc {
    /// Offset from the body origin
    pub position: Vec3,
    /// Full box size
    pub extents: Vec3,
    pub friction: f32,
    pub is_sensor: bool,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            extents: Vec3::ONE,
            friction: 0.0,
            is_sensor: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// Two bodies started or stopped touching during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyHandle,
    pub point: Vec3,
    pub distance: f32,
}

/// Everything gameplay code needs from a physics engine.
pub trait Physics {
    fn body_create(&mut self, desc: BodyDesc) -> BodyHandle;
    /// Returns false when the handle was already stale.
    fn body_destroy(&mut self, body: BodyHandle) -> bool;
    fn body_is_valid(&self, body: BodyHandle) -> bool;
    fn body_add_collider(&mut self, body: BodyHandle, desc: ColliderDesc) -> ColliderHandle;

    fn body_kind(&self, body: BodyHandle) -> BodyKind;
    fn body_position(&self, body: BodyHandle) -> Vec3;
    fn body_set_position(&mut self, body: BodyHandle, position: Vec3);
    fn body_rotation(&self, body: BodyHandle) -> AxisAngle;
    fn body_set_rotation(&mut self, body: BodyHandle, axis: Vec3, angle: f32);
    fn body_linear_velocity(&self, body: BodyHandle) -> Vec3;
    fn body_set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    fn body_angular_velocity(&self, body: BodyHandle) -> Vec3;
    fn body_set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    fn body_set_awake(&mut self, body: BodyHandle, awake: bool);
    fn body_is_awake(&self, body: BodyHandle) -> bool;
    fn body_user_data(&self, body: BodyHandle) -> Option<EntityId>;
    fn body_set_user_data(&mut self, body: BodyHandle, user_data: Option<EntityId>);

    fn collider_extents(&self, collider: ColliderHandle) -> Vec3;
    fn collider_set_extents(&mut self, collider: ColliderHandle, extents: Vec3);
    fn collider_local_position(&self, collider: ColliderHandle) -> Vec3;
    fn collider_set_local_position(&mut self, collider: ColliderHandle, position: Vec3);
    fn collider_is_sensor(&self, collider: ColliderHandle) -> bool;

    fn collider_body(&self, collider: ColliderHandle) -> BodyHandle {
        collider.body
    }

    /// Collider center in world space.
    fn collider_world_position(&self, collider: ColliderHandle) -> Vec3 {
        self.body_position(collider.body) + self.collider_local_position(collider)
    }

    /// Nearest collider hit along `direction` within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    fn set_gravity(&mut self, gravity: Vec3);
    fn set_iterations(&mut self, iterations: u32);
    fn set_paused(&mut self, paused: bool);
    fn is_paused(&self) -> bool;

    /// Advance the simulation and report contact transitions.
    fn step(&mut self, dt: f32) -> Vec<ContactEvent>;
}
