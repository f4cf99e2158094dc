//! Level lifecycle
//!
//! A `Level` is the decoded `.nklvl` file plus everything built from it: the
//! entities, the tiles and the two cameras. Loading decodes first and only
//! then tears the previous level down, so a bad file leaves the running level
//! untouched.
//!
//! The editor is a mode of the level, not a separate tool. Toggling it swaps
//! to the overhead camera, shows debug colliders and pauses physics.

use std::path::Path;
use std::time::Instant;

use super::camera::Camera;
use super::entity_manager::EntityManager;
use super::event::EventBus;
use super::tile_manager::TileManager;
use crate::config::{GameConfig, MinorVersionPolicy};
use crate::input::{InputAction, InputSource};
use crate::math::{Color, Vec2, Vec3};
use crate::physics::Physics;
use crate::render::Renderer;
use crate::resources::ResourceDatabase;
use crate::world::{LevelError, NkLevelFile, TileType};

pub const MAIN_CAMERA_POSITION: Vec3 = Vec3::new(-22.0, 0.0, 9.0);
pub const MAIN_CAMERA_TARGET: Vec3 = Vec3::new(0.0, 0.0, -3.0);
pub const MAIN_CAMERA_SPEED: f32 = 20.0;

pub const GUI_CAMERA_POSITION: Vec3 = Vec3::new(-77.3, 80.0, 8.3);
pub const GUI_CAMERA_SPEED: f32 = 50.0;

const HUD_FONT_SIZE: f32 = 24.0;

fn gui_camera() -> Camera {
    let mut camera = Camera::new(GUI_CAMERA_POSITION, GUI_CAMERA_SPEED);
    camera.yaw = -0.20;
    camera.pitch = -48.5;
    camera.far = 500.0;
    camera.update_basis();
    camera
}

pub struct Level {
    pub nkbin: NkLevelFile,
    pub main_camera: Camera,
    pub gui_camera: Camera,
    pub entities: EntityManager,
    pub tiles: TileManager,
    resources: ResourceDatabase,
    minor_version: MinorVersionPolicy,

    pub is_paused: bool,
    pub has_editor: bool,
    pub debug_mode: bool,
    is_loaded: bool,
}

impl Level {
    pub fn new(config: &GameConfig, resources: ResourceDatabase) -> Self {
        Self {
            nkbin: NkLevelFile::new(&config.hub_level),
            main_camera: Camera::looking_at(MAIN_CAMERA_POSITION, MAIN_CAMERA_TARGET, MAIN_CAMERA_SPEED),
            gui_camera: gui_camera(),
            entities: EntityManager::new(config.coin_reset),
            tiles: TileManager::new(),
            resources,
            minor_version: config.minor_version,
            is_paused: false,
            has_editor: false,
            debug_mode: false,
            is_loaded: false,
        }
    }

    /// Decode `path` and replace the current level with it.
    ///
    /// On error nothing changes: the previous level keeps running.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, physics: &mut dyn Physics) -> Result<(), LevelError> {
        let path = path.as_ref();
        let start = Instant::now();

        let nkbin = NkLevelFile::load(path, self.minor_version)?;

        self.unload(physics);
        self.nkbin = nkbin;
        self.is_paused = false;
        self.main_camera.position = self.nkbin.start_position;

        self.entities.load(physics, &self.nkbin);
        self.tiles.load(physics, &self.nkbin);
        self.is_loaded = true;

        log::info!(
            "{} loaded in {:.2?}",
            path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            start.elapsed()
        );
        Ok(())
    }

    pub fn unload(&mut self, physics: &mut dyn Physics) {
        if !self.is_loaded {
            return;
        }
        self.entities.destroy(physics);
        self.tiles.destroy(physics);
        self.is_loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Back to the state right after load. Tiles and points don't change.
    pub fn reset(&mut self, physics: &mut dyn Physics) {
        self.is_paused = false;
        self.main_camera.position = self.nkbin.start_position;
        self.entities.reset(physics, self.nkbin.start_position);
        log::debug!("Level '{}' reset", self.nkbin.path.display());
    }

    /// Capture the live entities and tiles, then write the file.
    pub fn save(&mut self, physics: &dyn Physics) -> Result<(), LevelError> {
        self.entities.save(physics, &mut self.nkbin);
        self.tiles.save(physics, &mut self.nkbin);
        self.nkbin.save()?;
        log::info!("Saved level '{}'", self.nkbin.path.display());
        Ok(())
    }

    pub fn toggle_editor(&mut self, physics: &mut dyn Physics) {
        self.has_editor = !self.has_editor;
        self.debug_mode = self.has_editor;
        physics.set_paused(self.has_editor);
        log::debug!("Editor {}", if self.has_editor { "on" } else { "off" });
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    pub fn current_camera(&self) -> &Camera {
        if self.has_editor {
            &self.gui_camera
        } else {
            &self.main_camera
        }
    }

    fn current_camera_mut(&mut self) -> &mut Camera {
        if self.has_editor {
            &mut self.gui_camera
        } else {
            &mut self.main_camera
        }
    }

    pub fn resources(&self) -> &ResourceDatabase {
        &self.resources
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// One gameplay frame: editor input, camera movement, the physics step
    /// and contact resolution. A paused level only listens for the editor
    /// toggle.
    pub fn update(&mut self, input: &dyn InputSource, physics: &mut dyn Physics, bus: &mut EventBus, dt: f32) {
        if input.action_pressed(InputAction::ToggleEditor) {
            self.toggle_editor(physics);
        }

        if self.is_paused {
            return;
        }

        if self.has_editor {
            self.update_editor(input, physics);
        }

        self.current_camera_mut().move_by(input.movement(), dt);

        if !self.has_editor {
            self.entities.update(physics, self.main_camera.position, &self.tiles, bus);
        }

        for contact in physics.step(dt) {
            self.entities.resolve_contact(physics, &contact, bus);
        }
    }

    fn update_editor(&mut self, input: &dyn InputSource, physics: &mut dyn Physics) {
        if input.action_pressed(InputAction::CursorForward) {
            self.tiles.move_cursor(1, 0);
        } else if input.action_pressed(InputAction::CursorBack) {
            self.tiles.move_cursor(-1, 0);
        }

        if input.action_pressed(InputAction::CursorRight) {
            self.tiles.move_cursor(0, 1);
        } else if input.action_pressed(InputAction::CursorLeft) {
            self.tiles.move_cursor(0, -1);
        }

        let placed = [
            (InputAction::PlaceRoad, TileType::Road),
            (InputAction::PlacePavement, TileType::Pavement),
            (InputAction::PlaceTunnel, TileType::Tunnel),
        ]
        .into_iter()
        .find(|(action, _)| input.action_pressed(*action));
        if let Some((_, tile_type)) = placed {
            self.tiles.place_tile(physics, tile_type);
        }

        if input.action_pressed(InputAction::RemoveTile) {
            if let Some(id) = self.tiles.tile_at_cursor() {
                self.tiles.queue_removal(id);
            }
        }
        self.tiles.apply_removals(physics);
        self.entities.apply_removals(physics);

        if input.action_pressed(InputAction::ResetLevel) {
            self.reset(physics);
        }

        if input.action_pressed(InputAction::SaveLevel) {
            if let Err(e) = self.save(physics) {
                log::error!("Failed to save '{}': {}", self.nkbin.path.display(), e);
            }
        }
    }

    pub fn render(&self, physics: &dyn Physics, renderer: &mut dyn Renderer) {
        renderer.begin_3d(self.current_camera());
        self.tiles.render(physics, renderer, &self.resources, self.debug_mode);
        self.entities.render(physics, renderer, &self.resources, self.debug_mode);
        renderer.end_3d();
    }

    /// Editor overlay: file name and cursor position
    pub fn render_hud(&self, renderer: &mut dyn Renderer) {
        if !self.has_editor {
            return;
        }

        let name = self.nkbin.path.display().to_string();
        let cursor = self.tiles.cursor();
        let lines = [
            format!("Editing: {}", name),
            format!("Cursor: ({}, {})", cursor.x, cursor.z),
            format!("Tiles: {}  Entities: {}", self.tiles.len(), self.entities.len()),
        ];

        for (i, line) in lines.iter().enumerate() {
            let position = Vec2::new(10.0, HUD_FONT_SIZE * (i as f32 + 1.0));
            renderer.draw_text(line, position, HUD_FONT_SIZE, Color::WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameEvent;
    use crate::input::testing::ScriptedInput;
    use crate::physics::BoxWorld;
    use crate::render::testing::RecordingRenderer;
    use crate::world::{NkPoint, NkVehicle, PointType, VehicleType};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    fn write_level(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut nkbin = NkLevelFile::new(&path);
        nkbin.start_position = Vec3::new(-20.0, 0.0, 0.0);
        nkbin.points.push(NkPoint {
            position: Vec3::new(30.0, 0.0, 0.0),
            scale: Vec3::new(4.0, 4.0, 4.0),
            point_type: PointType::End,
        });
        nkbin.vehicles.push(NkVehicle {
            position: Vec3::new(0.0, 0.0, -40.0),
            direction: Vec3::new(0.0, 0.0, 1.0),
            acceleration: 30.0,
            vehicle_type: VehicleType::Truck,
        });
        nkbin.save().expect("Failed to write level");
        path
    }

    fn new_level() -> Level {
        Level::new(&GameConfig::default(), ResourceDatabase::empty())
    }

    #[test]
    fn test_load_positions_camera_and_entities() {
        let dir = setup_test_dir();
        let path = write_level(&dir, "C1L0.nklvl");
        let mut world = BoxWorld::new();
        let mut level = new_level();

        level.load(&path, &mut world).unwrap();

        assert!(level.is_loaded());
        assert_eq!(level.main_camera.position, Vec3::new(-20.0, 0.0, 0.0));
        assert_eq!(level.entities.vehicles().count(), 1);
        assert_eq!(world.body_count(), 3);
    }

    #[test]
    fn test_failed_load_keeps_previous_level() {
        let dir = setup_test_dir();
        let path = write_level(&dir, "C1L0.nklvl");
        let mut world = BoxWorld::new();
        let mut level = new_level();
        level.load(&path, &mut world).unwrap();

        let err = level.load(dir.path().join("missing.nklvl"), &mut world);
        assert!(matches!(err, Err(LevelError::FileNotFound(_))));
        assert_eq!(level.nkbin.path, path);
        assert_eq!(world.body_count(), 3);
    }

    #[test]
    fn test_reload_replaces_bodies() {
        let dir = setup_test_dir();
        let path = write_level(&dir, "C1L0.nklvl");
        let mut world = BoxWorld::new();
        let mut level = new_level();

        level.load(&path, &mut world).unwrap();
        level.load(&path, &mut world).unwrap();
        assert_eq!(world.body_count(), 3);

        level.unload(&mut world);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_toggle_editor_pauses_physics() {
        let mut world = BoxWorld::new();
        let mut level = new_level();

        level.update(&ScriptedInput::pressing(&[InputAction::ToggleEditor]), &mut world, &mut EventBus::new(), 0.016);
        assert!(level.has_editor && level.debug_mode);
        assert!(world.is_paused());
        assert_eq!(level.current_camera().position, GUI_CAMERA_POSITION);

        level.toggle_editor(&mut world);
        assert!(!world.is_paused());
        assert_eq!(level.current_camera().position, level.main_camera.position);
    }

    #[test]
    fn test_player_follows_main_camera() {
        let dir = setup_test_dir();
        let path = write_level(&dir, "C1L0.nklvl");
        let mut world = BoxWorld::new();
        let mut level = new_level();
        level.load(&path, &mut world).unwrap();

        let input = ScriptedInput {
            movement: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        level.update(&input, &mut world, &mut EventBus::new(), 0.1);

        let player = level.entities.player().unwrap();
        assert_ne!(level.main_camera.position, Vec3::new(-20.0, 0.0, 0.0));
        assert_eq!(world.body_position(player.body), level.main_camera.position);
    }

    #[test]
    fn test_editor_places_and_saves_tiles() {
        let dir = setup_test_dir();
        let path = write_level(&dir, "C1L0.nklvl");
        let mut world = BoxWorld::new();
        let mut level = new_level();
        level.load(&path, &mut world).unwrap();
        level.toggle_editor(&mut world);

        let mut bus = EventBus::new();
        level.update(&ScriptedInput::pressing(&[InputAction::PlacePavement]), &mut world, &mut bus, 0.016);
        level.update(&ScriptedInput::pressing(&[InputAction::CursorForward]), &mut world, &mut bus, 0.016);
        level.update(&ScriptedInput::pressing(&[InputAction::PlaceRoad]), &mut world, &mut bus, 0.016);
        level.update(&ScriptedInput::pressing(&[InputAction::SaveLevel]), &mut world, &mut bus, 0.016);

        let saved = NkLevelFile::load(&path, MinorVersionPolicy::Strict).unwrap();
        assert_eq!(saved.tiles.len(), 2);
        assert_eq!(saved.tiles[1].tile_type, TileType::Road);
        assert_eq!(saved.tiles[1].position, Vec3::new(16.0, -2.0, 8.0));
        assert_eq!(saved.vehicles.len(), 1);
    }

    #[test]
    fn test_reset_after_loss() {
        let dir = setup_test_dir();
        let path = dir.path().join("C1L1.nklvl");
        let mut nkbin = NkLevelFile::new(&path);
        nkbin.start_position = Vec3::new(0.0, 0.0, 0.0);
        nkbin.points.push(NkPoint {
            position: Vec3::ZERO,
            scale: Vec3::new(4.0, 4.0, 4.0),
            point_type: PointType::Death,
        });
        nkbin.save().unwrap();

        let mut world = BoxWorld::new();
        let mut level = new_level();
        let mut bus = EventBus::new();
        level.load(&path, &mut world).unwrap();
        level.update(&ScriptedInput::default(), &mut world, &mut bus, 0.016);

        assert_eq!(bus.drain(), vec![GameEvent::LevelLost]);
        assert!(!level.entities.player().unwrap().is_active);

        level.is_paused = true;
        level.reset(&mut world);
        assert!(!level.is_paused);
        assert!(level.entities.player().unwrap().is_active);
    }

    #[test]
    fn test_paused_level_does_not_step() {
        let dir = setup_test_dir();
        let path = write_level(&dir, "C1L0.nklvl");
        let mut world = BoxWorld::new();
        let mut level = new_level();
        level.load(&path, &mut world).unwrap();
        level.set_paused(true);

        level.update(&ScriptedInput::default(), &mut world, &mut EventBus::new(), 1.0);
        let (_, truck) = level.entities.vehicles().next().unwrap();
        assert_eq!(world.body_position(truck.body), Vec3::new(0.0, 0.0, -40.0));
    }

    #[test]
    fn test_hud_only_in_editor() {
        let mut world = BoxWorld::new();
        let mut level = new_level();
        let mut renderer = RecordingRenderer::new(800.0, 600.0);

        level.render_hud(&mut renderer);
        assert!(renderer.texts().is_empty());

        level.toggle_editor(&mut world);
        level.render_hud(&mut renderer);
        assert_eq!(renderer.texts().len(), 3);
    }
}
