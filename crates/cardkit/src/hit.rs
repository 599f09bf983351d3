//! Pointer picking against the card group.
//!
//! The whole group answers to one rectangle in its local XY plane; the host
//! casts a ray per pointer event and asks whether it lands inside.

use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    /// Half width and half height in group-local units.
    pub half_extents: Vec2,
    /// Local Z of the plane.
    pub z: f32,
}

impl HitRegion {
    /// Group-local hit point of `ray` after applying `transform` to the
    /// region, if it falls inside the rectangle in front of the ray origin.
    pub fn intersect(&self, ray: &Ray, transform: Mat4) -> Option<Vec2> {
        let inv = transform.inverse();
        let origin = inv.transform_point3(ray.origin);
        let dir = inv.transform_vector3(ray.dir);

        if dir.z.abs() < 1e-6 {
            return None;
        }
        let t = (self.z - origin.z) / dir.z;
        if t < 0.0 {
            return None;
        }
        let p = origin + dir * t;
        let inside = p.x.abs() <= self.half_extents.x && p.y.abs() <= self.half_extents.y;
        inside.then(|| Vec2::new(p.x, p.y))
    }

    #[inline]
    pub fn contains(&self, ray: &Ray, transform: Mat4) -> bool {
        self.intersect(ray, transform).is_some()
    }
}
