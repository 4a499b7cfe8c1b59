//! 3D bounding volumes for gaze hit testing

use serde::{Deserialize, Serialize};

use super::{Point3D, Ray, Vector3D};

/// Radius given to point bounds so a ray can actually strike them
const POINT_HIT_RADIUS: f32 = 1e-3;

/// 3D bounding volume types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Bounds {
    /// Axis-aligned bounding box
    #[serde(rename = "aabb")]
    AABB { min: Point3D, max: Point3D },
    /// Bounding sphere
    Sphere { center: Point3D, radius: f32 },
    /// A single point (for very small elements)
    Point { at: Point3D },
}

impl Bounds {
    /// Create an AABB from center and half-extents
    pub fn aabb_centered(center: Point3D, half_extents: Vector3D) -> Self {
        Self::AABB {
            min: Point3D::new(
                center.x - half_extents.x,
                center.y - half_extents.y,
                center.z - half_extents.z,
            ),
            max: Point3D::new(
                center.x + half_extents.x,
                center.y + half_extents.y,
                center.z + half_extents.z,
            ),
        }
    }

    pub fn sphere(center: Point3D, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    pub fn point(at: Point3D) -> Self {
        Self::Point { at }
    }

    /// Get the center of the bounds
    pub fn center(&self) -> Point3D {
        match self {
            Bounds::AABB { min, max } => min.midpoint(max),
            Bounds::Sphere { center, .. } => *center,
            Bounds::Point { at } => *at,
        }
    }

    /// Distance along `ray` to the first intersection with the bounds.
    ///
    /// A ray starting inside the bounds hits at distance `0.0`. Volumes
    /// entirely behind the origin are not hit.
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        match self {
            Bounds::AABB { min, max } => ray_aabb(ray, min, max),
            Bounds::Sphere { center, radius } => ray_sphere(ray, center, *radius),
            Bounds::Point { at } => ray_sphere(ray, at, POINT_HIT_RADIUS),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::Point {
            at: Point3D::ORIGIN,
        }
    }
}

fn ray_sphere(ray: &Ray, center: &Point3D, radius: f32) -> Option<f32> {
    let oc = ray.origin - *center;
    let c = oc.magnitude_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = oc.dot(&ray.direction);
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

fn ray_aabb(ray: &Ray, min: &Point3D, max: &Point3D) -> Option<f32> {
    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let direction = [ray.direction.x, ray.direction.y, ray.direction.z];
    let lo = [min.x, min.y, min.z];
    let hi = [max.x, max.y, max.z];

    let mut t_near = 0.0_f32;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        if direction[axis].abs() < f32::EPSILON {
            // Parallel to this slab: must already be between its planes
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction[axis];
        let mut t1 = (lo[axis] - origin[axis]) * inv;
        let mut t2 = (hi[axis] - origin[axis]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_near = t_near.max(t1);
        t_far = t_far.min(t2);
        if t_near > t_far {
            return None;
        }
    }

    Some(t_near)
}
