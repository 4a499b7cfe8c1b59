//! 3D vector representation for gaze directions

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A vector in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3D {
    /// Zero vector
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };
    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    /// Unit vector pointing forward (+Z)
    pub const FORWARD: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit-length copy, or `ZERO` when the vector has no length
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
                z: self.z / mag,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Vector3D) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Angle between two vectors in radians
    pub fn angle(&self, other: &Vector3D) -> f32 {
        let mags = self.magnitude() * other.magnitude();
        if mags > 0.0 {
            (self.dot(other) / mags).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }

    /// Angle between two vectors in degrees
    pub fn angle_degrees(&self, other: &Vector3D) -> f32 {
        self.angle(other).to_degrees()
    }

    /// Whether the vector is too short to carry a direction
    pub fn is_degenerate(&self) -> bool {
        self.magnitude_squared() < 1e-12
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector3D {
    type Output = Vector3D;

    fn mul(self, rhs: f32) -> Self::Output {
        Vector3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;

    fn neg(self) -> Self::Output {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let n = Vector3D::new(3.0, 0.0, 0.0).normalize();
        assert!((n.magnitude() - 1.0).abs() < 0.0001);
        assert_eq!(n.x, 1.0);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        assert_eq!(Vector3D::ZERO.normalize(), Vector3D::ZERO);
        assert!(Vector3D::ZERO.is_degenerate());
    }

    #[test]
    fn test_angle_degrees() {
        let angle = Vector3D::RIGHT.angle_degrees(&Vector3D::UP);
        assert!((angle - 90.0).abs() < 0.001);
        assert_eq!(Vector3D::FORWARD.angle_degrees(&Vector3D::FORWARD), 0.0);
    }
}
