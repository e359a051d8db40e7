use geoview_common::ViewportSize;
use glam::{Mat4, Vec3};

/// Fixed perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(3.0, 2.0, 4.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: ViewportSize::FALLBACK.aspect(),
        }
    }
}

impl Camera {
    pub fn new(size: ViewportSize) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(size);
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Recompute the aspect ratio. Zero dimensions use the fallback size.
    pub fn set_viewport(&mut self, size: ViewportSize) {
        self.aspect = size.aspect();
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
