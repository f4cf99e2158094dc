//! Entity manager
//!
//! Owns every non-tile entity of the loaded level: the player, the optional
//! coin, the point markers and the vehicles. Points and vehicles keep their
//! load order, which is also their save order.
//!
//! Contacts from the physics step are turned into game events here. A contact
//! whose bodies don't both map to live, active entities is dropped; nothing is
//! replayed when an entity becomes active again.

use super::components::{coin, vehicle_spec, Entity, EntityKind, DEFAULT_ACCELERATION};
use super::entity::{EntityArena, EntityId};
use super::event::{EventBus, GameEvent};
use super::factory::{
    coin_create, entity_destroy, player_create, player_set_active, point_create, vehicle_create,
    vehicle_set_active,
};
use super::tile_manager::TileManager;
use crate::audio::SoundType;
use crate::config::CoinResetPolicy;
use crate::math::{Color, Vec3};
use crate::physics::{ContactEvent, ContactPhase, Physics};
use crate::render::{Renderer, Transform};
use crate::resources::{ResourceDatabase, ResourceType};
use crate::world::{limits, NkLevelFile, NkPoint, NkVehicle, PointType, VehicleType};

const DEBUG_VEHICLE_COLOR: Color = Color::new(1.0, 0.0, 0.0, 1.0);
const DEBUG_COLOR: Color = Color::new(0.0, 1.0, 0.0, 1.0);

/// Chapter served by each chapter point of the shipped hub, keyed by the
/// point's whole-unit Z position.
const HUB_CHAPTER_SLOTS: [(i32, u8); 3] = [(-8, 1), (8, 3), (24, 2)];

pub struct EntityManager {
    entities: EntityArena<Entity>,
    player: Option<EntityId>,
    coin: Option<EntityId>,
    points: Vec<EntityId>,
    vehicles: Vec<EntityId>,
    pending_removals: Vec<EntityId>,
    coin_reset: CoinResetPolicy,
}

impl EntityManager {
    pub fn new(coin_reset: CoinResetPolicy) -> Self {
        Self {
            entities: EntityArena::new(),
            player: None,
            coin: None,
            points: Vec::new(),
            vehicles: Vec::new(),
            pending_removals: Vec::new(),
            coin_reset,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replace the current entities with the ones described by `nkbin`.
    pub fn load(&mut self, physics: &mut dyn Physics, nkbin: &NkLevelFile) {
        self.destroy(physics);

        let start = nkbin.start_position;
        self.player = Some(self.entities.insert_with(|id| player_create(physics, id, start)));

        if nkbin.has_coin {
            let position = nkbin.coin_position;
            self.coin = Some(self.entities.insert_with(|id| coin_create(physics, id, position)));
        }

        for point in &nkbin.points {
            let id = self
                .entities
                .insert_with(|id| point_create(physics, id, point.point_type, point.position, point.scale));
            self.points.push(id);
        }

        for v in &nkbin.vehicles {
            let id = self.entities.insert_with(|id| {
                vehicle_create(physics, id, v.vehicle_type, v.position, v.direction, v.acceleration)
            });
            self.vehicles.push(id);
        }

        log::debug!(
            "Loaded {} points, {} vehicles, coin: {}",
            self.points.len(),
            self.vehicles.len(),
            nkbin.has_coin
        );
    }

    /// Capture the live state into `nkbin`. Positions come from the bodies,
    /// so a moved vehicle is saved where it is now.
    pub fn save(&self, physics: &dyn Physics, nkbin: &mut NkLevelFile) {
        if let Some(player) = self.player() {
            nkbin.start_position = physics.body_position(player.body);
        }

        match self.coin() {
            Some(coin) => {
                nkbin.coin_position = physics.body_position(coin.body);
                nkbin.has_coin = coin.is_active;
            }
            None => nkbin.has_coin = false,
        }

        nkbin.points = self
            .points()
            .filter_map(|(_, e)| {
                Some(NkPoint {
                    position: physics.body_position(e.body),
                    scale: physics.collider_extents(e.collider),
                    point_type: e.point_type()?,
                })
            })
            .collect();

        nkbin.vehicles = self
            .vehicles()
            .filter_map(|(_, e)| {
                let data = e.vehicle()?;
                Some(NkVehicle {
                    position: physics.body_position(e.body),
                    direction: data.direction,
                    acceleration: data.acceleration,
                    vehicle_type: data.vehicle_type,
                })
            })
            .collect();
    }

    /// Player back to `start_position` and active, vehicles back to their
    /// start with fresh velocity. Points never change. The coin follows the
    /// reset policy.
    pub fn reset(&mut self, physics: &mut dyn Physics, start_position: Vec3) {
        if let Some(player) = self.player.and_then(|id| self.entities.get_mut(id)) {
            physics.body_set_position(player.body, start_position);
            player.start_pos = start_position;
            if let Some(data) = player.player_mut() {
                data.footstep = None;
            }
            player_set_active(physics, player, true);
        }

        for &id in &self.vehicles {
            if let Some(v) = self.entities.get_mut(id) {
                physics.body_set_position(v.body, v.start_pos);
                vehicle_set_active(physics, v, true);
            }
        }

        if self.coin_reset == CoinResetPolicy::Respawn {
            if let Some(c) = self.coin.and_then(|id| self.entities.get_mut(id)) {
                physics.body_set_position(c.body, c.start_pos);
                c.is_active = true;
                physics.body_set_awake(c.body, true);
                physics.body_set_angular_velocity(c.body, coin::SPIN);
            }
        }
    }

    /// Destroy every body and forget every entity.
    pub fn destroy(&mut self, physics: &mut dyn Physics) {
        for entity in self.entities.clear() {
            entity_destroy(physics, &entity);
        }
        self.player = None;
        self.coin = None;
        self.points.clear();
        self.vehicles.clear();
        self.pending_removals.clear();
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// The player follows `camera_position` while active and allowed to move.
    /// A change of ground under the player queues its footstep sound.
    pub fn update(&mut self, physics: &mut dyn Physics, camera_position: Vec3, tiles: &TileManager, bus: &mut EventBus) {
        let Some(player) = self.player.and_then(|id| self.entities.get_mut(id)) else {
            return;
        };
        let can_move = player.player().map_or(false, |p| p.can_move);
        if !player.is_active || !can_move {
            return;
        }

        physics.body_set_position(player.body, camera_position);

        let footstep = tiles.footstep_under(physics, player);
        if let Some(data) = player.player_mut() {
            if data.footstep != footstep {
                data.footstep = footstep;
                if let Some(sound) = footstep {
                    bus.send(GameEvent::SoundPlayed(sound));
                }
            }
        }
    }

    /// Turn one contact transition into game events.
    pub fn resolve_contact(&mut self, physics: &mut dyn Physics, contact: &ContactEvent, bus: &mut EventBus) {
        let (Some(id_a), Some(id_b)) = (
            physics.body_user_data(contact.body_a),
            physics.body_user_data(contact.body_b),
        ) else {
            return;
        };

        let (Some(a), Some(b)) = (self.entities.get(id_a), self.entities.get(id_b)) else {
            return;
        };
        if !a.is_active || !b.is_active {
            return;
        }

        if a.is_player() {
            self.resolve_player(physics, contact.phase, id_a, id_b, bus);
        } else if b.is_player() {
            self.resolve_player(physics, contact.phase, id_b, id_a, bus);
        } else if a.is_vehicle() {
            self.resolve_vehicle(physics, contact.phase, id_a, id_b);
        } else if b.is_vehicle() {
            self.resolve_vehicle(physics, contact.phase, id_b, id_a);
        }
    }

    fn resolve_player(
        &mut self,
        physics: &mut dyn Physics,
        phase: ContactPhase,
        player_id: EntityId,
        other_id: EntityId,
        bus: &mut EventBus,
    ) {
        let Some(other_kind) = self.entities.get(other_id).map(|e| e.kind.clone()) else {
            return;
        };

        match (phase, other_kind) {
            (ContactPhase::Begin, EntityKind::Vehicle(_)) => {
                if let Some(vehicle) = self.entities.get_mut(other_id) {
                    vehicle_set_active(physics, vehicle, false);
                }
                self.deactivate_player(physics, player_id);
                bus.send(GameEvent::LevelLost);
            }
            (ContactPhase::Begin, EntityKind::Point(PointType::End)) => {
                self.deactivate_player(physics, player_id);
                bus.send(GameEvent::LevelWon);
            }
            (ContactPhase::Begin, EntityKind::Point(PointType::Death | PointType::VehicleReset)) => {
                self.deactivate_player(physics, player_id);
                bus.send(GameEvent::LevelLost);
            }
            (ContactPhase::Begin, EntityKind::Point(PointType::Chapter)) => {
                if let Some(chapter) = self.chapter_index(other_id) {
                    bus.send(GameEvent::ChapterEntered { point: other_id, chapter });
                }
            }
            (ContactPhase::End, EntityKind::Point(PointType::Chapter)) => {
                if let Some(chapter) = self.chapter_index(other_id) {
                    bus.send(GameEvent::ChapterExited { point: other_id, chapter });
                }
            }
            (ContactPhase::Begin, EntityKind::Coin) => {
                if let Some(c) = self.entities.get_mut(other_id) {
                    c.is_active = false;
                    physics.body_set_awake(c.body, false);
                }
                bus.send(GameEvent::CoinCollected);
                bus.send(GameEvent::SoundPlayed(SoundType::KeyCollect));
            }
            _ => {}
        }
    }

    fn resolve_vehicle(&mut self, physics: &mut dyn Physics, phase: ContactPhase, vehicle_id: EntityId, other_id: EntityId) {
        if phase != ContactPhase::Begin {
            return;
        }
        let is_reset_point = self
            .entities
            .get(other_id)
            .and_then(|e| e.point_type())
            .map_or(false, |p| p == PointType::VehicleReset);
        if !is_reset_point {
            return;
        }

        if let Some(vehicle) = self.entities.get(vehicle_id) {
            physics.body_set_position(vehicle.body, vehicle.start_pos);
        }
    }

    fn deactivate_player(&mut self, physics: &mut dyn Physics, player_id: EntityId) {
        if let Some(player) = self.entities.get_mut(player_id) {
            player_set_active(physics, player, false);
        }
    }

    /// Chapter a chapter point leads to. Points on the hub's slots use the
    /// slot's chapter; any other point counts by its position among the
    /// chapter points, starting at 1.
    pub fn chapter_index(&self, point: EntityId) -> Option<u8> {
        let entity = self.entities.get(point)?;
        if entity.point_type() != Some(PointType::Chapter) {
            return None;
        }

        let z = entity.start_pos.z as i32;
        if let Some(&(_, chapter)) = HUB_CHAPTER_SLOTS.iter().find(|(slot_z, _)| *slot_z == z) {
            return Some(chapter);
        }

        self.points
            .iter()
            .filter(|&&id| self.entities.get(id).and_then(|e| e.point_type()) == Some(PointType::Chapter))
            .position(|&id| id == point)
            .map(|i| (i + 1) as u8)
    }

    pub fn render(&self, physics: &dyn Physics, renderer: &mut dyn Renderer, resources: &ResourceDatabase, debug_mode: bool) {
        for (_, v) in self.vehicles() {
            let Some(data) = v.vehicle() else { continue };
            let spec = vehicle_spec(data.vehicle_type);
            let transform = Transform::new(physics.body_position(v.body), physics.body_rotation(v.body), Vec3::splat(spec.model_scale));
            renderer.queue_model(resources.get(spec.model), &transform);

            if debug_mode {
                renderer.debug_collider(physics.collider_world_position(v.collider), physics.collider_extents(v.collider), DEBUG_VEHICLE_COLOR);
            }
        }

        if let Some(c) = self.coin().filter(|c| c.is_active) {
            let transform = Transform::new(physics.body_position(c.body), physics.body_rotation(c.body), Vec3::splat(coin::MODEL_SCALE));
            renderer.queue_model(resources.get(ResourceType::CoinModel), &transform);
        }

        if let Some(player) = self.player() {
            let transform = Transform::new(physics.body_position(player.body), physics.body_rotation(player.body), physics.collider_extents(player.collider));
            renderer.queue_mesh(resources.get(ResourceType::Cube), None, &transform);
        }

        if !debug_mode {
            return;
        }
        let debug_entities = self.player().into_iter().chain(self.coin()).chain(self.points().map(|(_, e)| e));
        for e in debug_entities {
            renderer.debug_collider(physics.collider_world_position(e.collider), physics.collider_extents(e.collider), DEBUG_COLOR);
        }
    }

    // =========================================================================
    // Editor operations
    // =========================================================================

    pub fn add_point(&mut self, physics: &mut dyn Physics, point_type: PointType, position: Vec3, scale: Vec3) -> Option<EntityId> {
        if self.points.len() >= limits::POINTS_MAX {
            log::warn!("Cannot add point: level already has {} points", limits::POINTS_MAX);
            return None;
        }
        let id = self.entities.insert_with(|id| point_create(physics, id, point_type, position, scale));
        self.points.push(id);
        Some(id)
    }

    pub fn add_vehicle(
        &mut self,
        physics: &mut dyn Physics,
        vehicle_type: VehicleType,
        position: Vec3,
        direction: Vec3,
        acceleration: Option<f32>,
    ) -> Option<EntityId> {
        if self.vehicles.len() >= limits::VEHICLES_MAX {
            log::warn!("Cannot add vehicle: level already has {} vehicles", limits::VEHICLES_MAX);
            return None;
        }
        let acceleration = acceleration.unwrap_or(DEFAULT_ACCELERATION);
        let id = self
            .entities
            .insert_with(|id| vehicle_create(physics, id, vehicle_type, position, direction, acceleration));
        self.vehicles.push(id);
        Some(id)
    }

    /// Change a vehicle's acceleration and re-seed its velocity.
    pub fn set_vehicle_acceleration(&mut self, physics: &mut dyn Physics, id: EntityId, acceleration: f32) -> bool {
        let Some(v) = self.entities.get_mut(id) else { return false };
        let Some(data) = v.vehicle_mut() else { return false };
        data.acceleration = acceleration;

        let active = v.is_active;
        vehicle_set_active(physics, v, false);
        vehicle_set_active(physics, v, active);
        true
    }

    /// Move an entity and make the new position its start position.
    pub fn set_entity_position(&mut self, physics: &mut dyn Physics, id: EntityId, position: Vec3) -> bool {
        let Some(e) = self.entities.get_mut(id) else { return false };
        physics.body_set_position(e.body, position);
        e.start_pos = position;
        true
    }

    pub fn set_entity_active(&mut self, physics: &mut dyn Physics, id: EntityId, active: bool) -> bool {
        let Some(e) = self.entities.get_mut(id) else { return false };
        if e.is_vehicle() {
            vehicle_set_active(physics, e, active);
        } else if e.is_player() {
            player_set_active(physics, e, active);
        } else {
            e.is_active = active;
            physics.body_set_awake(e.body, active);
        }
        true
    }

    /// Mark an entity for removal at the next `apply_removals`.
    pub fn queue_removal(&mut self, id: EntityId) {
        if Some(id) == self.player {
            log::warn!("The player cannot be removed");
            return;
        }
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    /// Remove queued entities and destroy their bodies. Returns how many went.
    pub fn apply_removals(&mut self, physics: &mut dyn Physics) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.pending_removals) {
            let Some(entity) = self.entities.remove(id) else { continue };
            entity_destroy(physics, &entity);
            self.points.retain(|&p| p != id);
            self.vehicles.retain(|&v| v != id);
            if self.coin == Some(id) {
                self.coin = None;
            }
            removed += 1;
        }
        removed
    }

    pub fn clear_vehicles(&mut self, physics: &mut dyn Physics) {
        for id in std::mem::take(&mut self.vehicles) {
            if let Some(entity) = self.entities.remove(id) {
                entity_destroy(physics, &entity);
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.player.and_then(|id| self.entities.get_mut(id))
    }

    pub fn coin_id(&self) -> Option<EntityId> {
        self.coin
    }

    pub fn coin(&self) -> Option<&Entity> {
        self.coin.and_then(|id| self.entities.get(id))
    }

    pub fn points(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.points.iter().filter_map(move |&id| self.entities.get(id).map(|e| (id, e)))
    }

    pub fn vehicles(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.vehicles.iter().filter_map(move |&id| self.entities.get(id).map(|e| (id, e)))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Live entities, player included
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BoxWorld;

    fn level() -> NkLevelFile {
        let mut nkbin = NkLevelFile::new("test.nklvl");
        nkbin.start_position = Vec3::new(-20.0, 0.0, 0.0);
        nkbin.points.push(NkPoint {
            position: Vec3::new(30.0, 0.0, 0.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            point_type: PointType::End,
        });
        nkbin.vehicles.push(NkVehicle {
            position: Vec3::new(0.0, 0.0, -40.0),
            direction: Vec3::new(0.0, 0.0, 1.0),
            acceleration: 30.0,
            vehicle_type: VehicleType::Car,
        });
        nkbin
    }

    fn setup(nkbin: &NkLevelFile) -> (BoxWorld, EntityManager, EventBus) {
        let mut world = BoxWorld::new();
        let mut manager = EntityManager::new(CoinResetPolicy::StaySpent);
        manager.load(&mut world, nkbin);
        (world, manager, EventBus::new())
    }

    fn step(world: &mut BoxWorld, manager: &mut EntityManager, bus: &mut EventBus, dt: f32) {
        for contact in world.step(dt) {
            manager.resolve_contact(world, &contact, bus);
        }
    }

    #[test]
    fn test_load_builds_entities() {
        let (world, manager, _) = setup(&level());

        assert_eq!(manager.len(), 3);
        assert_eq!(world.body_count(), 3);
        assert!(manager.coin().is_none());
        assert_eq!(manager.points().count(), 1);
        assert_eq!(manager.vehicles().count(), 1);
    }

    #[test]
    fn test_save_of_untouched_load_matches() {
        let mut nkbin = level();
        nkbin.has_coin = true;
        nkbin.coin_position = Vec3::new(5.0, 0.0, 5.0);
        let (world, manager, _) = setup(&nkbin);

        let mut saved = NkLevelFile::new("test.nklvl");
        manager.save(&world, &mut saved);

        assert_eq!(saved.start_position, nkbin.start_position);
        assert_eq!(saved.coin_position, nkbin.coin_position);
        assert!(saved.has_coin);
        assert_eq!(saved.points, nkbin.points);
        assert_eq!(saved.vehicles, nkbin.vehicles);
    }

    #[test]
    fn test_coin_collected_once() {
        let mut nkbin = NkLevelFile::new("coin.nklvl");
        nkbin.start_position = Vec3::new(1.0, 1.0, 1.0);
        nkbin.has_coin = true;
        nkbin.coin_position = Vec3::new(1.0, 1.0, 1.0);
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        let coin = manager.coin().unwrap();
        assert!(coin.is_active);
        assert_eq!(world.body_position(coin.body), Vec3::new(1.0, 1.0, 1.0));

        step(&mut world, &mut manager, &mut bus, 0.016);
        step(&mut world, &mut manager, &mut bus, 0.016);

        let events = bus.drain();
        let collected = events.iter().filter(|e| **e == GameEvent::CoinCollected).count();
        assert_eq!(collected, 1);
        assert!(events.contains(&GameEvent::SoundPlayed(SoundType::KeyCollect)));
        assert!(!manager.coin().unwrap().is_active);
    }

    #[test]
    fn test_vehicle_hit_loses_level() {
        let mut nkbin = level();
        nkbin.start_position = Vec3::new(0.0, 0.0, -20.0);
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        // Car front reaches the player after well under a second at 30/s
        for _ in 0..60 {
            step(&mut world, &mut manager, &mut bus, 1.0 / 60.0);
        }

        assert_eq!(bus.drain(), vec![GameEvent::LevelLost]);
        assert!(!manager.player().unwrap().is_active);
        let (_, car) = manager.vehicles().next().unwrap();
        assert!(!car.is_active);
        assert!(!world.body_is_awake(car.body));
    }

    #[test]
    fn test_inactive_side_produces_nothing() {
        let mut nkbin = level();
        nkbin.start_position = Vec3::new(30.0, 0.0, 0.0);
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        let player = manager.player_id().unwrap();
        manager.player_mut().unwrap().is_active = false;

        let (point, _) = manager.points().next().unwrap();
        let contact = ContactEvent {
            phase: ContactPhase::Begin,
            body_a: manager.entity(player).unwrap().body,
            body_b: manager.entity(point).unwrap().body,
        };
        manager.resolve_contact(&mut world, &contact, &mut bus);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_end_point_wins() {
        let mut nkbin = level();
        nkbin.start_position = Vec3::new(30.0, 0.0, 0.0);
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        step(&mut world, &mut manager, &mut bus, 0.016);
        assert_eq!(bus.drain(), vec![GameEvent::LevelWon]);
        assert!(!manager.player().unwrap().is_active);
    }

    #[test]
    fn test_chapter_enter_and_exit() {
        let mut nkbin = NkLevelFile::new("hub.nklvl");
        for x in [0.0, 20.0] {
            nkbin.points.push(NkPoint {
                position: Vec3::new(x, 0.0, 0.0),
                scale: Vec3::new(4.0, 4.0, 4.0),
                point_type: PointType::Chapter,
            });
        }
        nkbin.start_position = Vec3::new(20.0, 0.0, 0.0);
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        step(&mut world, &mut manager, &mut bus, 0.016);
        let (second, _) = manager.points().nth(1).unwrap();
        assert_eq!(bus.drain(), vec![GameEvent::ChapterEntered { point: second, chapter: 2 }]);
        assert!(manager.player().unwrap().is_active);

        let player = manager.player().unwrap().body;
        world.body_set_position(player, Vec3::new(50.0, 0.0, 0.0));
        step(&mut world, &mut manager, &mut bus, 0.016);
        assert_eq!(bus.drain(), vec![GameEvent::ChapterExited { point: second, chapter: 2 }]);
    }

    #[test]
    fn test_hub_chapter_slots() {
        let mut nkbin = NkLevelFile::new("hub.nklvl");
        for z in [-8.0, 8.0, 24.0, 40.0] {
            nkbin.points.push(NkPoint {
                position: Vec3::new(0.0, 0.0, z),
                scale: Vec3::new(4.0, 4.0, 4.0),
                point_type: PointType::Chapter,
            });
        }
        let (_world, manager, _bus) = setup(&nkbin);

        let chapters: Vec<_> = manager.points().map(|(id, _)| manager.chapter_index(id)).collect();
        assert_eq!(chapters, vec![Some(1), Some(3), Some(2), Some(4)]);
        assert_eq!(manager.chapter_index(EntityId::NULL), None);
    }

    #[test]
    fn test_vehicle_reset_point_teleports() {
        let mut nkbin = level();
        nkbin.points[0] = NkPoint {
            position: Vec3::new(0.0, 0.0, -20.0),
            scale: Vec3::new(8.0, 8.0, 2.0),
            point_type: PointType::VehicleReset,
        };
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        for _ in 0..60 {
            step(&mut world, &mut manager, &mut bus, 1.0 / 60.0);
        }

        // Unhindered the car would be at z = -10 by now
        let (_, car) = manager.vehicles().next().unwrap();
        let z = world.body_position(car.body).z;
        assert!(z < -25.0, "car escaped to z = {}", z);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_reset_restores_start_state() {
        let mut nkbin = level();
        nkbin.start_position = Vec3::new(0.0, 0.0, -20.0);
        let (mut world, mut manager, mut bus) = setup(&nkbin);

        for _ in 0..60 {
            step(&mut world, &mut manager, &mut bus, 1.0 / 60.0);
        }
        assert!(!manager.player().unwrap().is_active);

        manager.reset(&mut world, nkbin.start_position);

        let player = manager.player().unwrap();
        assert!(player.is_active);
        assert_eq!(world.body_position(player.body), nkbin.start_position);
        for (_, v) in manager.vehicles() {
            let data = v.vehicle().unwrap();
            assert!(v.is_active);
            assert_eq!(world.body_position(v.body), v.start_pos);
            assert_eq!(world.body_linear_velocity(v.body), data.direction * data.acceleration);
        }
    }

    #[test]
    fn test_coin_reset_policy() {
        let mut nkbin = NkLevelFile::new("coin.nklvl");
        nkbin.has_coin = true;
        nkbin.coin_position = Vec3::new(1.0, 1.0, 1.0);
        nkbin.start_position = Vec3::new(1.0, 1.0, 1.0);

        for (policy, expect_active) in [(CoinResetPolicy::StaySpent, false), (CoinResetPolicy::Respawn, true)] {
            let mut world = BoxWorld::new();
            let mut manager = EntityManager::new(policy);
            let mut bus = EventBus::new();
            manager.load(&mut world, &nkbin);

            step(&mut world, &mut manager, &mut bus, 0.016);
            assert!(!manager.coin().unwrap().is_active);

            manager.reset(&mut world, Vec3::new(-50.0, 0.0, 0.0));
            assert_eq!(manager.coin().unwrap().is_active, expect_active);
        }
    }

    #[test]
    fn test_deferred_removal() {
        let (mut world, mut manager, _) = setup(&level());
        let (vehicle, _) = manager.vehicles().next().unwrap();
        let (point, _) = manager.points().next().unwrap();

        manager.queue_removal(vehicle);
        manager.queue_removal(point);
        manager.queue_removal(manager.player_id().unwrap());
        assert_eq!(manager.vehicles().count(), 1);

        assert_eq!(manager.apply_removals(&mut world), 2);
        assert_eq!(manager.vehicles().count(), 0);
        assert_eq!(manager.points().count(), 0);
        assert!(manager.player().is_some());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_editor_limits_and_acceleration() {
        let (mut world, mut manager, _) = setup(&level());

        let id = manager
            .add_vehicle(&mut world, VehicleType::Truck, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), None)
            .unwrap();
        let body = manager.entity(id).unwrap().body;
        assert_eq!(world.body_linear_velocity(body), Vec3::new(DEFAULT_ACCELERATION, 0.0, 0.0));

        assert!(manager.set_vehicle_acceleration(&mut world, id, 10.0));
        assert_eq!(world.body_linear_velocity(body), Vec3::new(10.0, 0.0, 0.0));

        for _ in manager.points().count()..limits::POINTS_MAX {
            assert!(manager.add_point(&mut world, PointType::Death, Vec3::ZERO, Vec3::ONE).is_some());
        }
        assert!(manager.add_point(&mut world, PointType::Death, Vec3::ZERO, Vec3::ONE).is_none());

        manager.clear_vehicles(&mut world);
        assert_eq!(manager.vehicles().count(), 0);
    }

    #[test]
    fn test_player_follows_camera() {
        let (mut world, mut manager, mut bus) = setup(&level());
        let tiles = TileManager::new();
        let target = Vec3::new(3.0, 0.0, 4.0);

        manager.update(&mut world, target, &tiles, &mut bus);
        assert_eq!(world.body_position(manager.player().unwrap().body), target);

        let player = manager.player_id().unwrap();
        manager.set_entity_active(&mut world, player, false);
        manager.update(&mut world, Vec3::ZERO, &tiles, &mut bus);
        assert_eq!(world.body_position(manager.player().unwrap().body), target);
    }
}
