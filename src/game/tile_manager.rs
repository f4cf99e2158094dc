//! Tile manager
//!
//! Ground tiles of a level plus the editor's placement cursor. Tiles carry no
//! user data, so they never show up in contact resolution; the only gameplay
//! they take part in is picking the player's footstep sound.

use super::components::{tile_spec, Entity, TILE_SIZE};
use super::entity::{EntityArena, EntityId};
use super::factory::{entity_destroy, tile_create};
use crate::audio::SoundType;
use crate::math::{Color, Vec3};
use crate::physics::Physics;
use crate::render::{Renderer, Transform};
use crate::resources::{ResourceDatabase, ResourceType};
use crate::world::{limits, NkLevelFile, NkTile, TileType};

pub const CURSOR_START: Vec3 = Vec3::new(TILE_SIZE, -2.0, TILE_SIZE);
pub const CURSOR_MIN: Vec3 = Vec3::new(-24.0, -2.0, -22.0);
pub const CURSOR_MAX: Vec3 = Vec3::new(40.0, -2.0, 42.0);

const CURSOR_COLOR: Color = Color::new(1.0, 0.0, 1.0, 0.2);

pub struct TileManager {
    tiles: EntityArena<Entity>,
    /// Placement order, which is also the saved order
    order: Vec<EntityId>,
    cursor: Vec3,
    pending_removals: Vec<EntityId>,
}

impl TileManager {
    pub fn new() -> Self {
        Self {
            tiles: EntityArena::new(),
            order: Vec::new(),
            cursor: CURSOR_START,
            pending_removals: Vec::new(),
        }
    }

    pub fn load(&mut self, physics: &mut dyn Physics, nkbin: &NkLevelFile) {
        self.destroy(physics);
        for tile in &nkbin.tiles {
            let id = self.tiles.insert(tile_create(physics, tile.tile_type, tile.position));
            self.order.push(id);
        }
        log::debug!("Loaded {} tiles", self.tiles.len());
    }

    pub fn save(&self, physics: &dyn Physics, nkbin: &mut NkLevelFile) {
        nkbin.tiles = self
            .iter()
            .filter_map(|(_, e)| {
                Some(NkTile {
                    position: physics.body_position(e.body),
                    tile_type: e.tile()?.tile_type,
                })
            })
            .collect();
    }

    /// Remove every tile. The cursor stays where it is.
    pub fn clear(&mut self, physics: &mut dyn Physics) {
        for tile in self.tiles.clear() {
            entity_destroy(physics, &tile);
        }
        self.order.clear();
        self.pending_removals.clear();
    }

    pub fn destroy(&mut self, physics: &mut dyn Physics) {
        self.clear(physics);
        self.cursor = CURSOR_START;
    }

    // =========================================================================
    // Editor cursor
    // =========================================================================

    pub fn cursor(&self) -> Vec3 {
        self.cursor
    }

    /// Move the cursor by whole tiles, clamped to the editable area.
    pub fn move_cursor(&mut self, dx: i32, dz: i32) {
        self.cursor.x = (self.cursor.x + dx as f32 * TILE_SIZE).clamp(CURSOR_MIN.x, CURSOR_MAX.x);
        self.cursor.z = (self.cursor.z + dz as f32 * TILE_SIZE).clamp(CURSOR_MIN.z, CURSOR_MAX.z);
    }

    /// Tile occupying the cursor's cell, if any
    pub fn tile_at_cursor(&self) -> Option<EntityId> {
        let cursor = self.cursor;
        self.iter()
            .find(|(_, e)| {
                let start = e.start_pos;
                (start.x - cursor.x).abs() < 0.5 && (start.z - cursor.z).abs() < 0.5
            })
            .map(|(id, _)| id)
    }

    /// Place a tile at the cursor. A tile already in that cell is replaced.
    pub fn place_tile(&mut self, physics: &mut dyn Physics, tile_type: TileType) -> Option<EntityId> {
        if let Some(existing) = self.tile_at_cursor() {
            self.remove(physics, existing);
        }

        if self.tiles.len() >= limits::TILES_MAX {
            log::warn!("Cannot place tile: level already has {} tiles", limits::TILES_MAX);
            return None;
        }

        let position = self.cursor + tile_spec(tile_type).place_offset;
        let id = self.tiles.insert(tile_create(physics, tile_type, position));
        self.order.push(id);
        Some(id)
    }

    fn remove(&mut self, physics: &mut dyn Physics, id: EntityId) -> bool {
        let Some(tile) = self.tiles.remove(id) else { return false };
        entity_destroy(physics, &tile);
        self.order.retain(|&t| t != id);
        true
    }

    pub fn queue_removal(&mut self, id: EntityId) {
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    pub fn apply_removals(&mut self, physics: &mut dyn Physics) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.pending_removals) {
            if self.remove(physics, id) {
                removed += 1;
            }
        }
        removed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Type of the tile whose footprint contains the entity and that lies
    /// at or below it. Heights are ignored otherwise.
    pub fn tile_under(&self, physics: &dyn Physics, entity: &Entity) -> Option<TileType> {
        let position = physics.collider_world_position(entity.collider);
        let extents = physics.collider_extents(entity.collider);

        self.iter().find_map(|(_, tile)| {
            let tile_pos = physics.collider_world_position(tile.collider);
            let reach = (physics.collider_extents(tile.collider) + extents) * 0.5;
            let diff = (tile_pos - position).abs();
            let under = diff.x < reach.x && diff.z < reach.z && tile_pos.y <= position.y;
            if under {
                tile.tile().map(|t| t.tile_type)
            } else {
                None
            }
        })
    }

    pub fn footstep_under(&self, physics: &dyn Physics, entity: &Entity) -> Option<SoundType> {
        self.tile_under(physics, entity).and_then(|t| tile_spec(t).footstep)
    }

    /// Live tiles in placement order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order.iter().filter_map(move |&id| self.tiles.get(id).map(|e| (id, e)))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn render(&self, physics: &dyn Physics, renderer: &mut dyn Renderer, resources: &ResourceDatabase, debug_mode: bool) {
        for (_, tile) in self.iter() {
            let Some(data) = tile.tile() else { continue };
            let transform = Transform::new(
                physics.body_position(tile.body),
                physics.body_rotation(tile.body),
                physics.collider_extents(tile.collider),
            );

            match data.tile_type {
                TileType::Road => renderer.queue_mesh(
                    resources.get(ResourceType::Cube),
                    resources.get(ResourceType::RoadMaterial),
                    &transform,
                ),
                TileType::Pavement => renderer.queue_mesh(
                    resources.get(ResourceType::Cube),
                    resources.get(ResourceType::PavementMaterial),
                    &transform,
                ),
                TileType::Tunnel => {
                    let transform = transform.scaled(Vec3::ONE);
                    renderer.queue_model(resources.get(ResourceType::TunnelModel), &transform);
                }
            }
        }

        if debug_mode {
            let transform = Transform::at(self.cursor).scaled(Vec3::new(TILE_SIZE, 1.0, TILE_SIZE));
            renderer.debug_cube(&transform, CURSOR_COLOR);
        }
    }
}

impl Default for TileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::factory::player_create;
    use crate::physics::BoxWorld;
    use crate::render::testing::{DrawCall, RecordingRenderer};

    #[test]
    fn test_cursor_moves_in_tiles_and_clamps() {
        let mut tiles = TileManager::new();
        assert_eq!(tiles.cursor(), Vec3::new(8.0, -2.0, 8.0));

        tiles.move_cursor(1, -1);
        assert_eq!(tiles.cursor(), Vec3::new(16.0, -2.0, 0.0));

        tiles.move_cursor(10, 10);
        assert_eq!(tiles.cursor(), Vec3::new(40.0, -2.0, 42.0));

        tiles.move_cursor(-20, -20);
        assert_eq!(tiles.cursor(), Vec3::new(-24.0, -2.0, -22.0));
    }

    #[test]
    fn test_pavement_is_raised() {
        let mut world = BoxWorld::new();
        let mut tiles = TileManager::new();

        tiles.place_tile(&mut world, TileType::Pavement);
        let mut nkbin = NkLevelFile::new("t.nklvl");
        tiles.save(&world, &mut nkbin);

        assert_eq!(nkbin.tiles.len(), 1);
        assert!((nkbin.tiles[0].position.y - (-1.7)).abs() < 1e-5);
    }

    #[test]
    fn test_place_replaces_same_cell() {
        let mut world = BoxWorld::new();
        let mut tiles = TileManager::new();

        tiles.place_tile(&mut world, TileType::Road);
        tiles.place_tile(&mut world, TileType::Tunnel);
        assert_eq!(tiles.len(), 1);
        assert_eq!(world.body_count(), 1);

        tiles.move_cursor(1, 0);
        tiles.place_tile(&mut world, TileType::Road);
        assert_eq!(tiles.len(), 2);
    }

    #[test]
    fn test_load_save_and_removal() {
        let mut world = BoxWorld::new();
        let mut nkbin = NkLevelFile::new("t.nklvl");
        nkbin.tiles = vec![
            NkTile { position: Vec3::new(0.0, -2.0, 0.0), tile_type: TileType::Road },
            NkTile { position: Vec3::new(8.0, -2.0, 0.0), tile_type: TileType::Tunnel },
        ];

        let mut tiles = TileManager::new();
        tiles.load(&mut world, &nkbin);

        let mut saved = NkLevelFile::new("t.nklvl");
        tiles.save(&world, &mut saved);
        assert_eq!(saved.tiles, nkbin.tiles);

        tiles.move_cursor(-1, -1);
        let id = tiles.tile_at_cursor().unwrap();
        tiles.queue_removal(id);
        tiles.queue_removal(id);
        assert_eq!(tiles.apply_removals(&mut world), 1);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_reload_keeps_tile_order() {
        let mut world = BoxWorld::new();
        let mut nkbin = NkLevelFile::new("t.nklvl");
        nkbin.tiles = vec![
            NkTile { position: Vec3::new(0.0, -2.0, 0.0), tile_type: TileType::Road },
            NkTile { position: Vec3::new(8.0, -1.7, 0.0), tile_type: TileType::Pavement },
            NkTile { position: Vec3::new(16.0, -2.0, 0.0), tile_type: TileType::Tunnel },
        ];

        let mut tiles = TileManager::new();
        tiles.load(&mut world, &nkbin);
        tiles.load(&mut world, &nkbin);

        let mut saved = NkLevelFile::new("t.nklvl");
        tiles.save(&world, &mut saved);
        assert_eq!(saved.tiles, nkbin.tiles);
        assert_eq!(saved.to_bytes().unwrap(), nkbin.to_bytes().unwrap());
    }

    #[test]
    fn test_tile_under_player() {
        let mut world = BoxWorld::new();
        let mut tiles = TileManager::new();
        tiles.place_tile(&mut world, TileType::Pavement);

        let mut arena = EntityArena::new();
        let id = arena.insert_with(|id| player_create(&mut world, id, Vec3::new(10.0, 0.0, 6.0)));
        let player = arena.get(id).unwrap();
        assert_eq!(tiles.tile_under(&world, player), Some(TileType::Pavement));
        assert_eq!(tiles.footstep_under(&world, player), Some(SoundType::TilePavement));

        world.body_set_position(player.body, Vec3::new(30.0, 0.0, 6.0));
        assert_eq!(tiles.tile_under(&world, player), None);
    }

    #[test]
    fn test_render_cursor_only_in_debug() {
        let world = BoxWorld::new();
        let tiles = TileManager::new();
        let resources = ResourceDatabase::empty();

        let mut renderer = RecordingRenderer::new(800.0, 600.0);
        tiles.render(&world, &mut renderer, &resources, false);
        assert!(renderer.calls.is_empty());

        tiles.render(&world, &mut renderer, &resources, true);
        assert!(matches!(renderer.calls[0], DrawCall::DebugCube { color, .. } if color == CURSOR_COLOR));
    }
}
