//! 3D perspective camera for viewing the terrain.
//!
//! Yaw and pitch are in radians. Yaw 0 looks down -Z, pitch 0 is level.

use glam::{Mat4, Vec3};

use crate::frustum::Frustum;

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 60.0;

/// Default near clip distance.
pub const DEFAULT_NEAR: f32 = 0.1;

/// Pitch limit just short of straight up/down.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world coordinates.
    pub position: Vec3,
    /// Heading around +Y in radians.
    pub yaw: f32,
    /// Elevation in radians.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Viewport size in pixels (width, height).
    pub viewport_size: (u32, u32),
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: 1000.0,
            viewport_size: (1280, 720),
        }
    }
}

impl Camera {
    /// Creates a camera with the given viewport and far plane.
    #[must_use]
    pub fn new(viewport_width: u32, viewport_height: u32, far: f32) -> Self {
        Self {
            far,
            viewport_size: (viewport_width, viewport_height),
            ..Self::default()
        }
    }

    /// Move camera by delta in world units.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Turn by yaw and pitch deltas in radians; pitch is clamped.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Set the viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_size = (width, height);
    }

    /// Width over height; 1.0 for a degenerate viewport.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.viewport_size;
        if w == 0 || h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }

    /// Unit view direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// World to view transform.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// View to clip transform with a `[0, 1]` depth range.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect_ratio(),
            self.near,
            self.far,
        )
    }

    /// Combined projection * view.
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Clip-space frustum of the current view.
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.view_proj())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_directions() {
        let mut camera = Camera::default();
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        camera.yaw = std::f32::consts::FRAC_PI_2;
        assert!((camera.forward() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.rotate(0.0, -20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_aspect_ratio() {
        let mut camera = Camera::new(1600, 800, 32.0);
        assert_eq!(camera.aspect_ratio(), 2.0);
        camera.set_viewport(0, 600);
        assert_eq!(camera.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_frustum_follows_view() {
        let mut camera = Camera::new(800, 600, 100.0);
        camera.translate(Vec3::new(0.0, 10.0, 0.0));
        let frustum = camera.frustum();
        assert!(frustum.contains_point(Vec3::new(0.0, 10.0, -50.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 10.0, 50.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 10.0, -150.0)));
    }
}
