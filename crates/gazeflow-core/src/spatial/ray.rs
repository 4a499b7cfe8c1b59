//! Gaze ray: an origin and a unit direction

use super::{Point3D, Vector3D};

/// A ray in world space with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3D,
    pub direction: Vector3D,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    pub fn new(origin: Point3D, direction: Vector3D) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at `distance` along the ray
    pub fn point_at(&self, distance: f32) -> Point3D {
        self.origin + self.direction * distance
    }
}
