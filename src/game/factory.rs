//! Entity factory
//!
//! Every gameplay object is created here: request a body and a box collider
//! from the physics world, then wrap the handles in an `Entity`. The id given
//! to a body becomes its user data, which is how contacts find their way back
//! to entities. Bodies created without an id are invisible to contact
//! resolution.

use super::components::{
    coin, tile_spec, vehicle_spec, Entity, EntityKind, PlayerData, TileData, VehicleData,
    PLAYER_EXTENTS,
};
use super::entity::EntityId;
use crate::math::{AxisAngle, Vec3, DEG2RAD};
use crate::physics::{BodyDesc, BodyKind, ColliderDesc, Physics};
use crate::world::{PointType, TileType, VehicleType};

/// Smallest collider size accepted on any axis
pub const MIN_EXTENT: f32 = 0.01;

/// Create a body with one box collider and wrap it in an entity.
///
/// Non-positive extents are clamped to `MIN_EXTENT`.
pub fn entity_create(
    physics: &mut dyn Physics,
    id: Option<EntityId>,
    kind: EntityKind,
    position: Vec3,
    extents: Vec3,
    body_kind: BodyKind,
    is_sensor: bool,
) -> Entity {
    let mut extents = extents;
    if !(extents.x > 0.0 && extents.y > 0.0 && extents.z > 0.0) {
        log::warn!(
            "Clamping non-positive extents ({}, {}, {}) of a {}",
            extents.x,
            extents.y,
            extents.z,
            kind.name()
        );
        extents = extents.max_elem(MIN_EXTENT);
    }

    let body = physics.body_create(BodyDesc {
        position,
        kind: body_kind,
        user_data: id,
    });
    let collider = physics.body_add_collider(
        body,
        ColliderDesc {
            position: Vec3::ZERO,
            extents,
            friction: 0.0,
            is_sensor,
        },
    );

    Entity {
        kind,
        is_active: true,
        start_pos: position,
        body,
        collider,
    }
}

/// Destroy the entity's body. The entity record itself is dropped by the caller.
pub fn entity_destroy(physics: &mut dyn Physics, entity: &Entity) {
    if !physics.body_destroy(entity.body) {
        log::trace!("Body of a {} was already gone", entity.kind.name());
    }
}

/// Box overlap of two entities' colliders, centered on the colliders' world
/// positions (body position plus local offset).
///
/// Extents are full sizes, so boxes overlap on an axis when the centers are
/// closer than half the summed sizes. All three axes must overlap.
pub fn aabb_test(physics: &dyn Physics, a: &Entity, b: &Entity) -> bool {
    let reach = (physics.collider_extents(a.collider) + physics.collider_extents(b.collider)) * 0.5;
    let diff = (physics.collider_world_position(a.collider) - physics.collider_world_position(b.collider)).abs();

    diff.x < reach.x && diff.y < reach.y && diff.z < reach.z
}

// =============================================================================
// Player
// =============================================================================

pub fn player_create(physics: &mut dyn Physics, id: EntityId, position: Vec3) -> Entity {
    let data = PlayerData {
        footstep: None,
        can_move: true,
    };
    entity_create(
        physics,
        Some(id),
        EntityKind::Player(data),
        position,
        PLAYER_EXTENTS,
        BodyKind::Kinematic,
        false,
    )
}

/// An inactive player keeps its body but stops following the camera and
/// stops starting contacts.
pub fn player_set_active(physics: &mut dyn Physics, player: &mut Entity, active: bool) {
    player.is_active = active;
    physics.body_set_awake(player.body, active);
}

// =============================================================================
// Vehicle
// =============================================================================

/// Vehicles move along `direction` at `acceleration` units per second and
/// face backwards when driving towards -Z.
pub fn vehicle_create(
    physics: &mut dyn Physics,
    id: EntityId,
    vehicle_type: VehicleType,
    position: Vec3,
    direction: Vec3,
    acceleration: f32,
) -> Entity {
    let spec = vehicle_spec(vehicle_type);
    let mut entity = entity_create(
        physics,
        Some(id),
        EntityKind::Object,
        position,
        spec.extents,
        BodyKind::Dynamic,
        false,
    );

    let initial_rotation = if direction.z <= -1.0 {
        AxisAngle::new(Vec3::UP, 180.0 * DEG2RAD)
    } else {
        AxisAngle::IDENTITY
    };
    physics.body_set_rotation(entity.body, initial_rotation.axis, initial_rotation.angle);
    physics.collider_set_local_position(entity.collider, spec.collider_offset);

    let data = VehicleData {
        vehicle_type,
        acceleration,
        direction,
        initial_rotation,
    };
    physics.body_set_linear_velocity(entity.body, data.velocity());
    entity.kind = EntityKind::Vehicle(data);
    entity
}

/// Activating a vehicle clears its spin, restores its initial facing and
/// re-seeds its velocity. Deactivating puts the body to sleep in place.
pub fn vehicle_set_active(physics: &mut dyn Physics, vehicle: &mut Entity, active: bool) {
    vehicle.is_active = active;
    physics.body_set_awake(vehicle.body, active);

    if !active {
        return;
    }
    let Some(data) = vehicle.vehicle() else {
        log::warn!("vehicle_set_active called on a {}", vehicle.kind.name());
        return;
    };

    physics.body_set_rotation(vehicle.body, data.initial_rotation.axis, data.initial_rotation.angle);
    physics.body_set_angular_velocity(vehicle.body, Vec3::ZERO);
    physics.body_set_linear_velocity(vehicle.body, data.velocity());
}

// =============================================================================
// Tiles, points, coin
// =============================================================================

/// Tiles carry no user data; ground checks use `aabb_test` instead of contacts.
pub fn tile_create(physics: &mut dyn Physics, tile_type: TileType, position: Vec3) -> Entity {
    let spec = tile_spec(tile_type);
    entity_create(
        physics,
        None,
        EntityKind::Tile(TileData { tile_type }),
        position,
        spec.extents,
        BodyKind::Static,
        false,
    )
}

/// Points are static sensors sized by `scale`.
pub fn point_create(
    physics: &mut dyn Physics,
    id: EntityId,
    point_type: PointType,
    position: Vec3,
    scale: Vec3,
) -> Entity {
    entity_create(
        physics,
        Some(id),
        EntityKind::Point(point_type),
        position,
        scale,
        BodyKind::Static,
        true,
    )
}

/// The coin is a dynamic body lying on its side, spinning about Y.
pub fn coin_create(physics: &mut dyn Physics, id: EntityId, position: Vec3) -> Entity {
    let entity = entity_create(
        physics,
        Some(id),
        EntityKind::Coin,
        position,
        coin::EXTENTS,
        BodyKind::Dynamic,
        false,
    );

    physics.collider_set_local_position(entity.collider, coin::COLLIDER_OFFSET);
    physics.body_set_rotation(entity.body, coin::ROTATION_AXIS, coin::ROTATION_ANGLE);
    physics.body_set_angular_velocity(entity.body, coin::SPIN);
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EntityArena;
    use crate::physics::BoxWorld;

    fn ids(n: usize) -> Vec<EntityId> {
        let mut arena = EntityArena::new();
        (0..n).map(|i| arena.insert(i)).collect()
    }

    #[test]
    fn test_create_sets_start_pos_and_user_data() {
        let mut world = BoxWorld::new();
        let id = ids(1)[0];
        let pos = Vec3::new(3.0, 0.0, -2.0);

        let player = player_create(&mut world, id, pos);
        assert!(player.is_active);
        assert_eq!(player.start_pos, pos);
        assert_eq!(world.body_position(player.body), pos);
        assert_eq!(world.body_user_data(player.body), Some(id));
        assert_eq!(world.body_kind(player.body), BodyKind::Kinematic);
    }

    #[test]
    fn test_non_positive_extents_are_clamped() {
        let mut world = BoxWorld::new();
        let e = entity_create(
            &mut world,
            None,
            EntityKind::Object,
            Vec3::ZERO,
            Vec3::new(0.0, -2.0, 3.0),
            BodyKind::Static,
            false,
        );
        assert_eq!(world.collider_extents(e.collider), Vec3::new(MIN_EXTENT, MIN_EXTENT, 3.0));
    }

    #[test]
    fn test_aabb_is_symmetric() {
        let mut world = BoxWorld::new();
        let cases = [
            (Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)),
            (Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)),
            (Vec3::new(-4.0, 1.0, 2.0), Vec3::new(-3.5, 1.2, 2.4)),
            (Vec3::new(5.0, 5.0, 5.0), Vec3::new(-5.0, 5.0, 5.0)),
        ];

        for (pa, pb) in cases {
            let a = tile_create(&mut world, TileType::Road, pa);
            let b = player_create(&mut world, ids(1)[0], pb);
            assert_eq!(aabb_test(&world, &a, &b), aabb_test(&world, &b, &a));
        }
    }

    #[test]
    fn test_aabb_uses_half_summed_extents() {
        let mut world = BoxWorld::new();
        let id = ids(1)[0];
        let tile = tile_create(&mut world, TileType::Road, Vec3::ZERO);

        // Tile is 8 wide, player 1 wide: reach on X is 4.5
        let inside = player_create(&mut world, id, Vec3::new(4.4, 0.0, 0.0));
        let outside = player_create(&mut world, id, Vec3::new(4.5, 0.0, 0.0));
        assert!(aabb_test(&world, &tile, &inside));
        assert!(!aabb_test(&world, &tile, &outside));
    }

    #[test]
    fn test_aabb_follows_collider_offset() {
        let mut world = BoxWorld::new();
        let ids = ids(2);
        let coin = coin_create(&mut world, ids[0], Vec3::ZERO);
        assert_eq!(world.collider_world_position(coin.collider), Vec3::new(0.0, 0.0, 1.6));

        // Coin reaches z=3.6, the player's box starts at z=2.5
        let player = player_create(&mut world, ids[1], Vec3::new(0.0, 0.0, 3.0));
        assert!(aabb_test(&world, &coin, &player));
        assert!(aabb_test(&world, &player, &coin));

        // Behind the coin's body, clear of its shifted collider
        world.body_set_position(player.body, Vec3::new(0.0, 0.0, -2.0));
        assert!(!aabb_test(&world, &coin, &player));
    }

    #[test]
    fn test_vehicle_facing_and_velocity() {
        let mut world = BoxWorld::new();
        let id = ids(1)[0];

        let backwards = vehicle_create(
            &mut world,
            id,
            VehicleType::Car,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            30.0,
        );
        assert!((world.body_rotation(backwards.body).yaw() - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(world.body_linear_velocity(backwards.body), Vec3::new(0.0, 0.0, -30.0));
        assert_eq!(world.collider_local_position(backwards.collider), Vec3::new(0.0, 2.5, 0.0));

        let forwards = vehicle_create(
            &mut world,
            id,
            VehicleType::Truck,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            10.0,
        );
        assert_eq!(world.body_rotation(forwards.body).angle, 0.0);
        assert_eq!(world.collider_extents(forwards.collider), Vec3::ONE);
    }

    #[test]
    fn test_vehicle_reactivation_reseeds_velocity() {
        let mut world = BoxWorld::new();
        let id = ids(1)[0];
        let mut car = vehicle_create(&mut world, id, VehicleType::Car, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 20.0);

        world.body_set_linear_velocity(car.body, Vec3::ZERO);
        world.body_set_angular_velocity(car.body, Vec3::new(0.0, 3.0, 0.0));
        vehicle_set_active(&mut world, &mut car, false);
        assert!(!car.is_active);
        assert!(!world.body_is_awake(car.body));

        vehicle_set_active(&mut world, &mut car, true);
        assert!(world.body_is_awake(car.body));
        assert_eq!(world.body_linear_velocity(car.body), Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(world.body_angular_velocity(car.body), Vec3::ZERO);
    }

    #[test]
    fn test_tile_has_no_user_data() {
        let mut world = BoxWorld::new();
        let tile = tile_create(&mut world, TileType::Pavement, Vec3::ZERO);
        assert_eq!(world.body_user_data(tile.body), None);
        assert_eq!(tile.tile().map(|t| t.tile_type), Some(TileType::Pavement));
    }

    #[test]
    fn test_point_is_static_sensor() {
        let mut world = BoxWorld::new();
        let id = ids(1)[0];
        let point = point_create(&mut world, id, PointType::End, Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0));
        assert!(world.collider_is_sensor(point.collider));
        assert_eq!(world.body_kind(point.body), BodyKind::Static);
        assert_eq!(point.point_type(), Some(PointType::End));
    }
}
