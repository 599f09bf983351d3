use cardkit::{hit::Ray, Viewport};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Fixed perspective camera looking down -Z at the card.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians).
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Eye at (0, 0, 10) with a 75° vertical field of view.
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            fov_y_rad: 75f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Updates the aspect ratio after a resize; ignores degenerate sizes.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Right-handed projection with depth in [0, 1], as wgpu expects.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// World-space ray through a device-pixel position.
    pub fn pick_ray(&self, x: f32, y: f32, viewport: Viewport) -> Ray {
        let ndc_x = 2.0 * x / viewport.width.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * y / viewport.height.max(1.0);
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(near, far - near)
    }

    /// Device-pixel position of a world point, or `None` behind the camera.
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Option<Vec2> {
        let clip = self.view_proj() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc.y) * 0.5 * viewport.height,
        ))
    }
}
