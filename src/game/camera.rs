//! Level cameras
//!
//! Yaw and pitch are in degrees. Yaw 0 looks down +X, pitch 0 is level.
//! Movement stays on the XZ plane regardless of pitch.

use crate::math::{Vec3, DEG2RAD, RAD2DEG};

/// Largest pitch magnitude, in degrees
pub const CAMERA_MAX_PITCH: f32 = 89.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second
    pub speed: f32,

    // Computed basis vectors
    pub front: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, speed: f32) -> Self {
        let mut cam = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            speed,
            front: Vec3::new(1.0, 0.0, 0.0),
            right: Vec3::new(0.0, 0.0, 1.0),
            up: Vec3::UP,
        };
        cam.update_basis();
        cam
    }

    /// Camera at `position` facing `target`.
    pub fn looking_at(position: Vec3, target: Vec3, speed: f32) -> Self {
        let mut cam = Self::new(position, speed);
        cam.look_at(target);
        cam
    }

    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = dir.z.atan2(dir.x) * RAD2DEG;
        self.pitch = (dir.y.asin() * RAD2DEG).clamp(-CAMERA_MAX_PITCH, CAMERA_MAX_PITCH);
        self.update_basis();
    }

    pub fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw * DEG2RAD, self.pitch * DEG2RAD);

        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(Vec3::UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Move by `input` scaled by speed and `dt`: x is forward/back along the
    /// flattened front, z is strafe along the right vector.
    pub fn move_by(&mut self, input: Vec3, dt: f32) {
        let step = self.speed * dt;
        let forward = Vec3::new(self.front.x, 0.0, self.front.z);

        self.position += forward * (input.x * step);
        self.position += self.right * (input.z * step);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-4
    }

    #[test]
    fn test_look_at_faces_target() {
        let cam = Camera::looking_at(Vec3::new(-22.0, 0.0, 9.0), Vec3::new(0.0, 0.0, -3.0), 20.0);
        let expected = Vec3::new(22.0, 0.0, -12.0).normalize();
        assert!(approx(cam.front, expected));
    }

    #[test]
    fn test_move_stays_on_ground_plane() {
        let mut cam = Camera::new(Vec3::ZERO, 10.0);
        cam.pitch = -45.0;
        cam.update_basis();

        cam.move_by(Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(cam.position.y, 0.0);
        assert!(cam.position.x > 0.0);
    }

    #[test]
    fn test_strafe_is_perpendicular() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0);
        cam.move_by(Vec3::new(0.0, 0.0, 1.0), 1.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 1.0)));
    }
}
