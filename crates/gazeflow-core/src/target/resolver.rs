//! Resolves a gaze ray to at most one target

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::TargetId;
use crate::spatial::Ray;

/// Bitmask of target layers.
///
/// The empty mask is treated as "every layer" by [`TargetResolver`], so a
/// host that never configured a filter still gets hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Mask selecting a single layer
    pub fn layer(layer: u8) -> Self {
        if layer < 32 {
            Self(1 << layer)
        } else {
            Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn includes(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

/// Nearest intersection reported by a hit test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub target: TargetId,
    pub distance: f32,
}

/// Hit-test capability supplied by the host scene.
///
/// Implementations return the nearest target within `max_distance` whose
/// layer is in `mask`. When several targets share the nearest distance the
/// first one the implementation encounters is reported.
pub trait HitTest {
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit>;
}

impl<F> HitTest for F
where
    F: Fn(&Ray, f32, LayerMask) -> Option<RayHit>,
{
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self(ray, max_distance, mask)
    }
}

/// Applies the distance bound and layer filter to a hit test
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver {
    pub max_distance: f32,
    pub mask: LayerMask,
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self {
            max_distance: 10.0,
            mask: LayerMask::NONE,
        }
    }
}

impl TargetResolver {
    pub fn new(max_distance: f32, mask: LayerMask) -> Self {
        Self { max_distance, mask }
    }

    /// Mask actually handed to the hit test
    pub fn effective_mask(&self) -> LayerMask {
        if self.mask.is_empty() {
            LayerMask::ALL
        } else {
            self.mask
        }
    }

    pub fn resolve(&self, ray: &Ray, hit_test: &dyn HitTest) -> Option<RayHit> {
        let hit = hit_test
            .raycast(ray, self.max_distance, self.effective_mask())
            .filter(|hit| hit.distance <= self.max_distance);

        match hit {
            Some(hit) => trace!(target_id = hit.target, distance = hit.distance, "Gaze ray hit"),
            None => trace!(
                origin = ?ray.origin,
                direction = ?ray.direction,
                max = self.max_distance,
                "No gaze hit"
            ),
        }
        hit
    }
}
