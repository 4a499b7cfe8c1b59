//! Exponential moving-average smoothing of gaze directions

use crate::spatial::Vector3D;

/// EMA filter over unit gaze directions
#[derive(Debug, Clone)]
pub struct GazeSmoother {
    /// 0 = maximum smoothing, 1 = raw samples pass through
    pub alpha: f32,
    last_direction: Option<Vector3D>,
}

impl GazeSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            last_direction: None,
        }
    }

    /// Blend `direction` into the running estimate and return the result
    pub fn smooth(&mut self, direction: Vector3D) -> Vector3D {
        let smoothed = match self.last_direction {
            Some(last) => {
                let blended = last + (direction - last) * self.alpha;
                if blended.is_degenerate() {
                    direction
                } else {
                    blended.normalize()
                }
            }
            None => direction,
        };
        self.last_direction = Some(smoothed);
        smoothed
    }

    /// Drop the running estimate (e.g. on source change)
    pub fn reset(&mut self) {
        self.last_direction = None;
    }
}
