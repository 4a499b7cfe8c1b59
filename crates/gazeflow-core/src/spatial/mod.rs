//! Spatial primitives for gaze rays and target volumes
//!
//! Uses a right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)

mod bounds;
mod point3d;
mod ray;
mod vector3d;

pub use bounds::Bounds;
pub use point3d::Point3D;
pub use ray::Ray;
pub use vector3d::Vector3D;
