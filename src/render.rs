//! Renderer collaborator
//!
//! Gameplay code submits draw requests and never reads anything back except
//! screen and text sizes. Nothing here is expected to be pixel exact.

use crate::game::Camera;
use crate::math::{AxisAngle, Color, Vec2, Vec3};
use crate::resources::ResourceId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: AxisAngle,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: AxisAngle, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, AxisAngle::IDENTITY, Vec3::ONE)
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

pub trait Renderer {
    /// Window size in pixels
    fn screen_size(&self) -> Vec2;
    /// Width and height of `text` at `font_size`
    fn measure_text(&self, text: &str, font_size: f32) -> Vec2;
    /// `position` is the top-left corner of the text
    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);

    fn begin_3d(&mut self, camera: &Camera);
    fn end_3d(&mut self);

    /// Unloaded resources arrive as None; the backend picks a fallback.
    fn queue_mesh(&mut self, mesh: Option<ResourceId>, material: Option<ResourceId>, transform: &Transform);
    fn queue_model(&mut self, model: Option<ResourceId>, transform: &Transform);

    fn debug_cube(&mut self, transform: &Transform, color: Color);
    /// Wireframe box with full size `extents` around `center`
    fn debug_collider(&mut self, center: Vec3, extents: Vec3, color: Color);
}
