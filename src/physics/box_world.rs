//! BoxWorld: a minimal axis-aligned box simulation
//!
//! Enough physics for a road-crossing game: bodies move by their velocity,
//! colliders are axis-aligned boxes, and overlaps between bodies are reported
//! as begin/end transitions. There is no contact response; sensors and solid
//! colliders overlap the same way.
//!
//! Rules:
//! - Static bodies never move by integration.
//! - Sleeping bodies neither move nor start new contacts. A contact that was
//!   already active when a body fell asleep stays active without an end event.
//! - Destroying a body drops its contacts silently.

use std::collections::BTreeSet;

use super::{
    BodyDesc, BodyHandle, BodyKind, ColliderDesc, ColliderHandle, ContactEvent, ContactPhase,
    Physics, RayHit,
};
use crate::game::EntityId;
use crate::math::{AxisAngle, Vec3};

#[derive(Debug, Clone)]
struct Collider {
    local_position: Vec3,
    extents: Vec3,
    is_sensor: bool,
}

#[derive(Debug, Clone)]
struct Body {
    kind: BodyKind,
    position: Vec3,
    rotation: AxisAngle,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    awake: bool,
    user_data: Option<EntityId>,
    colliders: Vec<Collider>,
}

impl Body {
    fn is_moving(&self) -> bool {
        self.awake && self.kind != BodyKind::Static
    }
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

type Pair = (BodyHandle, BodyHandle);

pub struct BoxWorld {
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    gravity: Vec3,
    iterations: u32,
    paused: bool,
    /// Pairs touching at the end of the last step, ordered (lower handle first)
    contacts: BTreeSet<Pair>,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            gravity: Vec3::ZERO,
            iterations: 1,
            paused: false,
            contacts: BTreeSet::new(),
        }
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    /// Whether two bodies are currently reported as touching.
    pub fn in_contact(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.contacts.contains(&ordered(a, b))
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut()
    }

    fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.body(handle.body)?.colliders.get(handle.slot as usize)
    }

    fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.body_mut(handle.body)?.colliders.get_mut(handle.slot as usize)
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.body.is_some())
            .map(|(i, s)| BodyHandle { index: i as u32, generation: s.generation })
            .collect()
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else { continue };
            if !body.is_moving() {
                continue;
            }

            if body.kind == BodyKind::Dynamic {
                body.linear_velocity += gravity * dt;
            }
            body.position += body.linear_velocity * dt;

            // Only spin about Y is tracked, and only for bodies already yawed
            let spin = body.angular_velocity.y;
            let yawed = body.rotation.angle == 0.0 || body.rotation.yaw() != 0.0;
            if spin != 0.0 && yawed {
                body.rotation = AxisAngle::new(Vec3::UP, body.rotation.yaw() + spin * dt);
            }
        }
    }

    /// Current overlapping pairs. Pairs involving a sleeping body are only
    /// kept when they were already touching.
    fn detect(&self, handles: &[BodyHandle], previous: &BTreeSet<Pair>) -> BTreeSet<Pair> {
        let mut touching = BTreeSet::new();

        for (i, &ha) in handles.iter().enumerate() {
            let Some(a) = self.body(ha) else { continue };
            for &hb in &handles[i + 1..] {
                let Some(b) = self.body(hb) else { continue };
                if a.kind == BodyKind::Static && b.kind == BodyKind::Static {
                    continue;
                }

                let pair = ordered(ha, hb);
                if !a.awake || !b.awake {
                    if previous.contains(&pair) {
                        touching.insert(pair);
                    }
                    continue;
                }

                if bodies_overlap(a, b) {
                    touching.insert(pair);
                }
            }
        }

        touching
    }
}

impl Default for BoxWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn ordered(a: BodyHandle, b: BodyHandle) -> Pair {
    if a <= b { (a, b) } else { (b, a) }
}

/// Per axis, centers closer than half the summed sizes.
fn boxes_overlap(pos_a: Vec3, ext_a: Vec3, pos_b: Vec3, ext_b: Vec3) -> bool {
    let diff = (pos_a - pos_b).abs();
    let reach = (ext_a + ext_b) * 0.5;
    diff.x < reach.x && diff.y < reach.y && diff.z < reach.z
}

fn bodies_overlap(a: &Body, b: &Body) -> bool {
    a.colliders.iter().any(|ca| {
        b.colliders.iter().any(|cb| {
            boxes_overlap(
                a.position + ca.local_position,
                ca.extents,
                b.position + cb.local_position,
                cb.extents,
            )
        })
    })
}

/// Slab test against an axis-aligned box. Returns the entry distance.
fn ray_box(origin: Vec3, dir: Vec3, center: Vec3, extents: Vec3) -> Option<f32> {
    let half = extents * 0.5;
    let min = center - half;
    let max = center + half;

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for (o, d, lo, hi) in [
        (origin.x, dir.x, min.x, max.x),
        (origin.y, dir.y, min.y, max.y),
        (origin.z, dir.z, min.z, max.z),
    ] {
        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - o) / d;
        let t2 = (hi - o) / d;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

impl Physics for BoxWorld {
    fn body_create(&mut self, desc: BodyDesc) -> BodyHandle {
        let body = Body {
            kind: desc.kind,
            position: desc.position,
            rotation: AxisAngle::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            awake: true,
            user_data: desc.user_data,
            colliders: Vec::new(),
        };

        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyHandle { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, body: Some(body) });
            BodyHandle { index, generation: 0 }
        }
    }

    fn body_destroy(&mut self, body: BodyHandle) -> bool {
        if self.body(body).is_none() {
            return false;
        }

        let slot = &mut self.slots[body.index as usize];
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(body.index);
        self.contacts.retain(|(a, b)| *a != body && *b != body);
        true
    }

    fn body_is_valid(&self, body: BodyHandle) -> bool {
        self.body(body).is_some()
    }

    fn body_add_collider(&mut self, body: BodyHandle, desc: ColliderDesc) -> ColliderHandle {
        let slot = match self.body_mut(body) {
            Some(b) => {
                b.colliders.push(Collider {
                    local_position: desc.position,
                    extents: desc.extents,
                    is_sensor: desc.is_sensor,
                });
                b.colliders.len() as u32 - 1
            }
            None => {
                log::warn!("Collider added to a stale body handle {:?}", body);
                u32::MAX
            }
        };
        ColliderHandle { body, slot }
    }

    fn body_kind(&self, body: BodyHandle) -> BodyKind {
        self.body(body).map(|b| b.kind).unwrap_or_default()
    }

    fn body_position(&self, body: BodyHandle) -> Vec3 {
        self.body(body).map(|b| b.position).unwrap_or_default()
    }

    fn body_set_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(b) = self.body_mut(body) {
            b.position = position;
        }
    }

    fn body_rotation(&self, body: BodyHandle) -> AxisAngle {
        self.body(body).map(|b| b.rotation).unwrap_or_default()
    }

    fn body_set_rotation(&mut self, body: BodyHandle, axis: Vec3, angle: f32) {
        if let Some(b) = self.body_mut(body) {
            b.rotation = AxisAngle::new(axis, angle);
        }
    }

    fn body_linear_velocity(&self, body: BodyHandle) -> Vec3 {
        self.body(body).map(|b| b.linear_velocity).unwrap_or_default()
    }

    fn body_set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(b) = self.body_mut(body) {
            b.linear_velocity = velocity;
        }
    }

    fn body_angular_velocity(&self, body: BodyHandle) -> Vec3 {
        self.body(body).map(|b| b.angular_velocity).unwrap_or_default()
    }

    fn body_set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(b) = self.body_mut(body) {
            b.angular_velocity = velocity;
        }
    }

    fn body_set_awake(&mut self, body: BodyHandle, awake: bool) {
        if let Some(b) = self.body_mut(body) {
            b.awake = awake;
        }
    }

    fn body_is_awake(&self, body: BodyHandle) -> bool {
        self.body(body).map(|b| b.awake).unwrap_or(false)
    }

    fn body_user_data(&self, body: BodyHandle) -> Option<EntityId> {
        self.body(body).and_then(|b| b.user_data)
    }

    fn body_set_user_data(&mut self, body: BodyHandle, user_data: Option<EntityId>) {
        if let Some(b) = self.body_mut(body) {
            b.user_data = user_data;
        }
    }

    fn collider_extents(&self, collider: ColliderHandle) -> Vec3 {
        self.collider(collider).map(|c| c.extents).unwrap_or_default()
    }

    fn collider_set_extents(&mut self, collider: ColliderHandle, extents: Vec3) {
        if let Some(c) = self.collider_mut(collider) {
            c.extents = extents;
        }
    }

    fn collider_local_position(&self, collider: ColliderHandle) -> Vec3 {
        self.collider(collider).map(|c| c.local_position).unwrap_or_default()
    }

    fn collider_set_local_position(&mut self, collider: ColliderHandle, position: Vec3) {
        if let Some(c) = self.collider_mut(collider) {
            c.local_position = position;
        }
    }

    fn collider_is_sensor(&self, collider: ColliderHandle) -> bool {
        self.collider(collider).map(|c| c.is_sensor).unwrap_or(false)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalize();
        if dir == Vec3::ZERO {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for handle in self.handles() {
            let Some(body) = self.body(handle) else { continue };
            for c in &body.colliders {
                let Some(t) = ray_box(origin, dir, body.position + c.local_position, c.extents) else {
                    continue;
                };
                if t > max_distance {
                    continue;
                }
                if best.map_or(true, |b| t < b.distance) {
                    best = Some(RayHit { body: handle, point: origin + dir * t, distance: t });
                }
            }
        }
        best
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations.max(1);
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        if self.paused || dt <= 0.0 {
            return Vec::new();
        }

        // Substep so fast bodies don't skip over thin sensors
        let handles = self.handles();
        let sub_dt = dt / self.iterations as f32;
        let mut previous = std::mem::take(&mut self.contacts);
        let mut events = Vec::new();

        for _ in 0..self.iterations {
            self.integrate(sub_dt);
            let current = self.detect(&handles, &previous);

            for &(a, b) in previous.difference(&current) {
                events.push(ContactEvent { phase: ContactPhase::End, body_a: a, body_b: b });
            }
            for &(a, b) in current.difference(&previous) {
                events.push(ContactEvent { phase: ContactPhase::Begin, body_a: a, body_b: b });
            }
            previous = current;
        }

        self.contacts = previous;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_box(world: &mut BoxWorld, kind: BodyKind, position: Vec3, extents: Vec3) -> BodyHandle {
        let body = world.body_create(BodyDesc { position, kind, user_data: None });
        world.body_add_collider(body, ColliderDesc { extents, ..Default::default() });
        body
    }

    #[test]
    fn test_begin_then_end() {
        let mut world = BoxWorld::new();
        let mover = add_box(&mut world, BodyKind::Dynamic, Vec3::new(-3.0, 0.0, 0.0), Vec3::ONE);
        let wall = add_box(&mut world, BodyKind::Static, Vec3::ZERO, Vec3::ONE);
        world.body_set_linear_velocity(mover, Vec3::new(2.0, 0.0, 0.0));

        // -3 -> -1: exactly one unit apart, not yet overlapping
        assert!(world.step(1.0).is_empty());

        // -1 -> 0 in four substeps, overlapping from the first one
        world.set_iterations(4);
        let events = world.step(0.5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, ContactPhase::Begin);
        assert!(world.in_contact(mover, wall));

        // 0 -> 2, separating at the second substep
        let events = world.step(1.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, ContactPhase::End);
        assert!(!world.in_contact(wall, mover));
    }

    #[test]
    fn test_static_bodies_never_move_or_touch() {
        let mut world = BoxWorld::new();
        let a = add_box(&mut world, BodyKind::Static, Vec3::ZERO, Vec3::ONE);
        let b = add_box(&mut world, BodyKind::Static, Vec3::ZERO, Vec3::ONE);
        world.body_set_linear_velocity(a, Vec3::new(5.0, 0.0, 0.0));

        assert!(world.step(1.0).is_empty());
        assert_eq!(world.body_position(a), Vec3::ZERO);
        assert!(!world.in_contact(a, b));
    }

    #[test]
    fn test_sleeping_body_does_not_move_or_begin() {
        let mut world = BoxWorld::new();
        let a = add_box(&mut world, BodyKind::Dynamic, Vec3::new(-3.0, 0.0, 0.0), Vec3::ONE);
        let _b = add_box(&mut world, BodyKind::Static, Vec3::ZERO, Vec3::ONE);
        world.body_set_linear_velocity(a, Vec3::new(3.0, 0.0, 0.0));
        world.body_set_awake(a, false);

        assert!(world.step(1.0).is_empty());
        assert_eq!(world.body_position(a), Vec3::new(-3.0, 0.0, 0.0));

        // Teleported into overlap while asleep: still no contact
        world.body_set_position(a, Vec3::ZERO);
        assert!(world.step(0.1).is_empty());
    }

    #[test]
    fn test_destroyed_handle_is_stale() {
        let mut world = BoxWorld::new();
        let a = add_box(&mut world, BodyKind::Kinematic, Vec3::ONE, Vec3::ONE);
        assert!(world.body_destroy(a));
        assert!(!world.body_destroy(a));
        assert!(!world.body_is_valid(a));
        assert_eq!(world.body_position(a), Vec3::ZERO);

        // Slot reuse gets a new generation
        let b = add_box(&mut world, BodyKind::Kinematic, Vec3::ONE, Vec3::ONE);
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_collider_offset_used_for_overlap() {
        let mut world = BoxWorld::new();
        let a = world.body_create(BodyDesc {
            position: Vec3::ZERO,
            kind: BodyKind::Kinematic,
            user_data: None,
        });
        let ca = world.body_add_collider(a, ColliderDesc {
            position: Vec3::new(0.0, 0.0, 5.0),
            extents: Vec3::ONE,
            ..Default::default()
        });
        let _b = add_box(&mut world, BodyKind::Static, Vec3::new(0.0, 0.0, 5.0), Vec3::ONE);

        assert_eq!(world.collider_world_position(ca), Vec3::new(0.0, 0.0, 5.0));
        let events = world.step(0.016);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_raycast_nearest_hit() {
        let mut world = BoxWorld::new();
        let near = add_box(&mut world, BodyKind::Static, Vec3::new(0.0, -5.0, 0.0), Vec3::splat(2.0));
        let _far = add_box(&mut world, BodyKind::Static, Vec3::new(0.0, -10.0, 0.0), Vec3::splat(2.0));

        let hit = world.raycast(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 100.0).unwrap();
        assert_eq!(hit.body, near);
        assert!((hit.distance - 4.0).abs() < 1e-4);

        assert!(world.raycast(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 3.0).is_none());
        assert!(world.raycast(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 100.0).is_none());
    }

    #[test]
    fn test_paused_world_is_frozen() {
        let mut world = BoxWorld::new();
        let a = add_box(&mut world, BodyKind::Dynamic, Vec3::ZERO, Vec3::ONE);
        world.body_set_linear_velocity(a, Vec3::new(1.0, 0.0, 0.0));
        world.set_paused(true);
        world.step(1.0);
        assert_eq!(world.body_position(a), Vec3::ZERO);
    }
}
