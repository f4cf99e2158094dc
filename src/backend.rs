//! macroquad backends
//!
//! Textures, sounds and the font are loaded up front (macroquad loading is
//! async) and handed out as ids through `ResourceLoader`. Meshes, models and
//! the skybox have no files behind them here: they get procedural ids and are
//! drawn as colored cubes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use macroquad::audio::{load_sound, play_sound, stop_sound, PlaySoundParams, Sound};
use macroquad::prelude as mq;

use crate::audio::AudioBackend;
use crate::game::Camera;
use crate::math::{Color, Vec2, Vec3};
use crate::render::{Renderer, Transform};
use crate::resources::{AssetKind, ResourceId, ResourceLoader, ResourceType};

const MODEL_COLORS: [Color; 4] = [
    Color::new(0.8, 0.2, 0.2, 1.0),
    Color::new(0.9, 0.8, 0.2, 1.0),
    Color::new(0.2, 0.5, 0.9, 1.0),
    Color::new(0.9, 0.5, 0.1, 1.0),
];

fn to_mq_color(color: Color) -> mq::Color {
    mq::Color::new(color.r, color.g, color.b, color.a)
}

fn to_mq_vec3(v: Vec3) -> mq::Vec3 {
    mq::vec3(v.x, v.y, v.z)
}

/// Candidate files for an asset, in lookup order
fn asset_paths(dir: &Path, kind: AssetKind, name: &str) -> Vec<PathBuf> {
    let extensions: &[&str] = match kind {
        AssetKind::Material => &["png"],
        AssetKind::Sound | AssetKind::Music => &["wav", "ogg"],
        AssetKind::Font => &["ttf"],
        AssetKind::Mesh | AssetKind::Skybox | AssetKind::Model => &[],
    };
    extensions.iter().map(|ext| dir.join(format!("{}.{}", name, ext))).collect()
}

fn model_color(id: Option<ResourceId>) -> Color {
    match id {
        Some(id) => MODEL_COLORS[id.0 as usize % MODEL_COLORS.len()],
        None => Color::WHITE,
    }
}

// =============================================================================
// Assets
// =============================================================================

#[derive(Default)]
pub struct MacroquadAssets {
    ids: HashMap<String, ResourceId>,
    textures: HashMap<ResourceId, mq::Texture2D>,
    sounds: HashMap<ResourceId, Sound>,
    font: Option<mq::Font>,
    next_id: u32,
}

impl MacroquadAssets {
    /// Load every file-backed asset under `dir`. Failures are logged and the
    /// asset is left out.
    pub async fn preload<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mut assets = Self::default();

        for ty in ResourceType::ALL {
            let kind = ty.asset_kind();
            for path in asset_paths(dir, kind, ty.asset_name()) {
                let Some(path_str) = path.to_str() else { continue };
                let loaded = match kind {
                    AssetKind::Material => match mq::load_texture(path_str).await {
                        Ok(texture) => {
                            let id = assets.issue(ty.asset_name());
                            assets.textures.insert(id, texture);
                            true
                        }
                        Err(_) => false,
                    },
                    AssetKind::Sound | AssetKind::Music => match load_sound(path_str).await {
                        Ok(sound) => {
                            let id = assets.issue(ty.asset_name());
                            assets.sounds.insert(id, sound);
                            true
                        }
                        Err(_) => false,
                    },
                    AssetKind::Font => match mq::load_ttf_font(path_str).await {
                        Ok(font) => {
                            assets.issue(ty.asset_name());
                            assets.font = Some(font);
                            true
                        }
                        Err(_) => false,
                    },
                    _ => false,
                };
                if loaded {
                    log::trace!("Loaded '{}'", path.display());
                    break;
                }
            }
        }

        log::debug!(
            "Preloaded {} textures and {} sounds from '{}'",
            assets.textures.len(),
            assets.sounds.len(),
            dir.display()
        );
        assets
    }

    fn issue(&mut self, name: &str) -> ResourceId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Split the loaded data between the renderer and the audio backend.
    pub fn into_backends(self) -> (MacroquadRenderer, MacroquadAudio) {
        let renderer = MacroquadRenderer {
            textures: self.textures,
            font: self.font,
        };
        let audio = MacroquadAudio { sounds: self.sounds };
        (renderer, audio)
    }
}

impl ResourceLoader for MacroquadAssets {
    fn load(&mut self, _group: &str, kind: AssetKind, name: &str) -> Option<ResourceId> {
        match kind {
            AssetKind::Mesh | AssetKind::Skybox | AssetKind::Model => Some(self.issue(name)),
            _ => self.ids.get(name).copied(),
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

pub struct MacroquadRenderer {
    textures: HashMap<ResourceId, mq::Texture2D>,
    font: Option<mq::Font>,
}

impl MacroquadRenderer {
    /// Draw with the model matrix set to `transform`'s position and rotation.
    fn with_transform(transform: &Transform, draw: impl FnOnce()) {
        let rotation = transform.rotation;
        let matrix = mq::Mat4::from_translation(to_mq_vec3(transform.position))
            * mq::Mat4::from_axis_angle(to_mq_vec3(rotation.axis.normalize()), rotation.angle);

        // SAFETY: the GL context lives for the whole program and is only
        // touched from the main thread.
        unsafe {
            mq::get_internal_gl().quad_gl.push_model_matrix(matrix);
        }
        draw();
        unsafe {
            mq::get_internal_gl().quad_gl.pop_model_matrix();
        }
    }
}

impl Renderer for MacroquadRenderer {
    fn screen_size(&self) -> Vec2 {
        Vec2::new(mq::screen_width(), mq::screen_height())
    }

    fn measure_text(&self, text: &str, font_size: f32) -> Vec2 {
        let mut size = Vec2::ZERO;
        for line in text.lines() {
            let dims = mq::measure_text(line, self.font.as_ref(), font_size as u16, 1.0);
            size.x = size.x.max(dims.width);
            size.y += font_size;
        }
        size
    }

    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        for (i, line) in text.lines().enumerate() {
            let params = mq::TextParams {
                font: self.font.as_ref(),
                font_size: font_size as u16,
                color: to_mq_color(color),
                ..Default::default()
            };
            // macroquad places text by its baseline
            let baseline = position.y + font_size * (i as f32 + 1.0);
            mq::draw_text_ex(line, position.x, baseline, params);
        }
    }

    fn begin_3d(&mut self, camera: &Camera) {
        mq::set_camera(&mq::Camera3D {
            position: to_mq_vec3(camera.position),
            target: to_mq_vec3(camera.position + camera.front),
            up: to_mq_vec3(camera.up),
            fovy: camera.fov.to_radians(),
            ..Default::default()
        });
    }

    fn end_3d(&mut self) {
        mq::set_default_camera();
    }

    fn queue_mesh(&mut self, _mesh: Option<ResourceId>, material: Option<ResourceId>, transform: &Transform) {
        let texture = material.and_then(|id| self.textures.get(&id));
        let tint = if texture.is_some() { mq::WHITE } else { mq::GRAY };
        let size = to_mq_vec3(transform.scale);
        Self::with_transform(transform, || mq::draw_cube(mq::Vec3::ZERO, size, texture, tint));
    }

    fn queue_model(&mut self, model: Option<ResourceId>, transform: &Transform) {
        let color = to_mq_color(model_color(model));
        let size = to_mq_vec3(transform.scale);
        Self::with_transform(transform, || mq::draw_cube(mq::Vec3::ZERO, size, None, color));
    }

    fn debug_cube(&mut self, transform: &Transform, color: Color) {
        let size = to_mq_vec3(transform.scale);
        let color = to_mq_color(color);
        Self::with_transform(transform, || mq::draw_cube(mq::Vec3::ZERO, size, None, color));
    }

    fn debug_collider(&mut self, center: Vec3, extents: Vec3, color: Color) {
        mq::draw_cube_wires(to_mq_vec3(center), to_mq_vec3(extents), to_mq_color(color));
    }
}

// =============================================================================
// Audio
// =============================================================================

pub struct MacroquadAudio {
    sounds: HashMap<ResourceId, Sound>,
}

impl AudioBackend for MacroquadAudio {
    fn play(&mut self, id: ResourceId, volume: f32, looped: bool) {
        if let Some(sound) = self.sounds.get(&id) {
            play_sound(sound, PlaySoundParams { looped, volume });
        }
    }

    fn stop(&mut self, id: ResourceId) {
        if let Some(sound) = self.sounds.get(&id) {
            stop_sound(sound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceDatabase;

    #[test]
    fn test_asset_paths() {
        let dir = Path::new("res");
        assert_eq!(asset_paths(dir, AssetKind::Material, "road"), vec![PathBuf::from("res/road.png")]);
        assert_eq!(
            asset_paths(dir, AssetKind::Music, "music_hub"),
            vec![PathBuf::from("res/music_hub.wav"), PathBuf::from("res/music_hub.ogg")]
        );
        assert!(asset_paths(dir, AssetKind::Model, "sedan").is_empty());
    }

    #[test]
    fn test_procedural_ids_without_files() {
        let mut assets = MacroquadAssets::default();
        let resources = ResourceDatabase::init(&mut assets);

        assert!(resources.get(ResourceType::Cube).is_some());
        assert!(resources.get(ResourceType::CarModel).is_some());
        assert_ne!(resources.get(ResourceType::CarModel), resources.get(ResourceType::TruckModel));
        assert!(resources.get(ResourceType::RoadMaterial).is_none());
        assert!(resources.get(ResourceType::SoundDeath).is_none());
    }

    #[test]
    fn test_same_name_same_id() {
        let mut assets = MacroquadAssets::default();
        let a = assets.load("g", AssetKind::Model, "cone");
        let b = assets.load("g", AssetKind::Model, "cone");
        assert_eq!(a, b);
        assert_eq!(model_color(None), Color::WHITE);
    }
}
