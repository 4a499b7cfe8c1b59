//! Ordered registry of lookable targets

use serde::{Deserialize, Serialize};

use super::{HitTest, LayerMask, RayHit};
use crate::spatial::{Bounds, Point3D, Ray};

/// Stable identifier of a target within a session
pub type TargetId = u32;

/// A lookable object: a tile, a star, a letter on a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub bounds: Bounds,
    /// Layer index (0-31) matched against a [`LayerMask`]
    #[serde(default)]
    pub layer: u8,
}

impl Target {
    pub fn new(id: TargetId, bounds: Bounds) -> Self {
        Self { id, bounds, layer: 0 }
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

/// Targets in registration order.
///
/// Registration order doubles as hit report order, which decides ties
/// between targets at exactly the same distance.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sphere targets of `radius` at each point, ids `0..n`
    pub fn from_points(points: &[Point3D], radius: f32, layer: u8) -> Self {
        let targets = points
            .iter()
            .enumerate()
            .map(|(i, p)| Target::new(i as TargetId, Bounds::sphere(*p, radius)).on_layer(layer))
            .collect();
        Self { targets }
    }

    /// Add a target, replacing any earlier target with the same id
    pub fn register(&mut self, target: Target) {
        match self.targets.iter_mut().find(|t| t.id == target.id) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<TargetId> {
        self.targets.iter().map(|t| t.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

impl HitTest for TargetRegistry {
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;

        for target in self.targets.iter().filter(|t| mask.includes(t.layer)) {
            let Some(distance) = target.bounds.ray_distance(ray) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            // Strict comparison keeps the first reported target on ties
            if nearest.map(|hit| distance < hit.distance).unwrap_or(true) {
                nearest = Some(RayHit {
                    target: target.id,
                    distance,
                });
            }
        }

        nearest
    }
}
