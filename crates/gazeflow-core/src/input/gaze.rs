//! Gaze sampling: turns eye and head poses into one ray per tick

use tracing::debug;

use super::{GazeInputs, GazeSmoother, PoseSample};
use crate::spatial::{Point3D, Ray, Vector3D};

/// Which pose source produced the current gaze ray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeSource {
    /// Average of both eyes
    Binocular,
    LeftEye,
    RightEye,
    /// Head forward, used when no eye is tracking
    Head,
}

/// A valid gaze ray for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub ray: Ray,
    pub source: GazeSource,
    /// Angle between the two eye directions, only known for binocular samples
    pub convergence_deg: Option<f32>,
}

impl GazeSample {
    /// Cursor point `distance` metres along the gaze ray
    pub fn cursor(&self, distance: f32) -> Point3D {
        self.ray.point_at(distance)
    }

    /// Average of both eye poses, ignoring their tracking flags.
    ///
    /// `None` when the two directions cancel out.
    pub fn binocular(left: &PoseSample, right: &PoseSample) -> Option<Self> {
        let l_dir = left.forward.normalize();
        let r_dir = right.forward.normalize();
        let combined = l_dir + r_dir;
        if combined.is_degenerate() {
            return None;
        }
        Some(Self {
            ray: Ray::new(left.position.midpoint(&right.position), combined),
            source: GazeSource::Binocular,
            convergence_deg: Some(l_dir.angle_degrees(&r_dir)),
        })
    }
}

/// Combines the per-tick pose sources into a single gaze ray.
///
/// No filtering is applied unless smoothing is configured, so tracker
/// jitter reaches the resolver unchanged.
#[derive(Debug, Clone)]
pub struct GazeSampler {
    use_head_fallback: bool,
    smoother: Option<GazeSmoother>,
    last_source: Option<GazeSource>,
}

impl Default for GazeSampler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GazeSampler {
    pub fn new(use_head_fallback: bool) -> Self {
        Self {
            use_head_fallback,
            smoother: None,
            last_source: None,
        }
    }

    /// Enable EMA smoothing of the direction
    pub fn with_smoothing(mut self, alpha: f32) -> Self {
        self.smoother = Some(GazeSmoother::new(alpha));
        self
    }

    pub fn uses_head_fallback(&self) -> bool {
        self.use_head_fallback
    }

    /// Source of the most recent valid sample
    pub fn last_source(&self) -> Option<GazeSource> {
        self.last_source
    }

    /// Build this tick's gaze ray, or `None` when no source is usable
    pub fn sample(&mut self, inputs: &GazeInputs) -> Option<GazeSample> {
        let (origin, direction, source, convergence_deg) = self
            .from_eyes(inputs)
            .or_else(|| self.from_head(inputs))?;

        if self.last_source != Some(source) {
            debug!(?source, previous = ?self.last_source, "Gaze source changed");
            if let Some(smoother) = self.smoother.as_mut() {
                smoother.reset();
            }
            self.last_source = Some(source);
        }

        let direction = match self.smoother.as_mut() {
            Some(smoother) => smoother.smooth(direction),
            None => direction,
        };

        Some(GazeSample {
            ray: Ray::new(origin, direction),
            source,
            convergence_deg,
        })
    }

    /// Forget smoothing history and the last source
    pub fn reset(&mut self) {
        self.last_source = None;
        if let Some(smoother) = self.smoother.as_mut() {
            smoother.reset();
        }
    }

    fn from_eyes(
        &self,
        inputs: &GazeInputs,
    ) -> Option<(Point3D, Vector3D, GazeSource, Option<f32>)> {
        let left = active(inputs.left);
        let right = active(inputs.right);

        match (left, right) {
            (Some(l), Some(r)) => GazeSample::binocular(&l, &r).map(|sample| {
                (
                    sample.ray.origin,
                    sample.ray.direction,
                    GazeSource::Binocular,
                    sample.convergence_deg,
                )
            }),
            (Some(eye), None) => single(eye, GazeSource::LeftEye),
            (None, Some(eye)) => single(eye, GazeSource::RightEye),
            (None, None) => None,
        }
    }

    fn from_head(
        &self,
        inputs: &GazeInputs,
    ) -> Option<(Point3D, Vector3D, GazeSource, Option<f32>)> {
        if !self.use_head_fallback {
            return None;
        }
        active(inputs.head).and_then(|head| single(head, GazeSource::Head))
    }
}

fn active(pose: Option<PoseSample>) -> Option<PoseSample> {
    pose.filter(|p| p.active)
}

fn single(
    pose: PoseSample,
    source: GazeSource,
) -> Option<(Point3D, Vector3D, GazeSource, Option<f32>)> {
    if pose.forward.is_degenerate() {
        return None;
    }
    Some((pose.position, pose.forward.normalize(), source, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(x: f32, forward: Vector3D) -> PoseSample {
        PoseSample::new(Point3D::new(x, 1.6, 0.0), forward)
    }

    #[test]
    fn test_binocular_average() {
        let mut sampler = GazeSampler::default();
        let inputs = GazeInputs::binocular(
            eye(-0.03, Vector3D::new(0.1, 0.0, 1.0)),
            eye(0.03, Vector3D::new(-0.1, 0.0, 1.0)),
        );

        let sample = sampler.sample(&inputs).unwrap();
        assert_eq!(sample.source, GazeSource::Binocular);
        assert!((sample.ray.origin.x).abs() < 1e-6);
        assert!((sample.ray.direction.z - 1.0).abs() < 1e-6);
        let convergence = sample.convergence_deg.unwrap();
        assert!(convergence > 11.0 && convergence < 11.5);
    }

    #[test]
    fn test_single_active_eye_is_used_alone() {
        let mut sampler = GazeSampler::default();
        let inputs = GazeInputs::binocular(
            eye(-0.03, Vector3D::RIGHT).inactive(),
            eye(0.03, Vector3D::FORWARD),
        );

        let sample = sampler.sample(&inputs).unwrap();
        assert_eq!(sample.source, GazeSource::RightEye);
        assert_eq!(sample.ray.direction, Vector3D::FORWARD);
        assert!(sample.convergence_deg.is_none());
    }

    #[test]
    fn test_head_fallback() {
        let mut sampler = GazeSampler::new(true);
        let head = PoseSample::new(Point3D::new(0.0, 1.7, 0.0), Vector3D::UP);
        let inputs = GazeInputs::binocular(
            eye(-0.03, Vector3D::FORWARD).inactive(),
            eye(0.03, Vector3D::FORWARD).inactive(),
        )
        .with_head(head);

        let sample = sampler.sample(&inputs).unwrap();
        assert_eq!(sample.source, GazeSource::Head);
        assert_eq!(sample.ray.origin, head.position);
    }

    #[test]
    fn test_no_fallback_means_no_gaze() {
        let mut sampler = GazeSampler::new(false);
        let head = PoseSample::new(Point3D::ORIGIN, Vector3D::FORWARD);
        assert!(sampler.sample(&GazeInputs::head_only(head)).is_none());
        assert!(sampler.sample(&GazeInputs::default()).is_none());
    }

    #[test]
    fn test_inactive_head_is_ignored() {
        let mut sampler = GazeSampler::new(true);
        let head = PoseSample::new(Point3D::ORIGIN, Vector3D::FORWARD).inactive();
        assert!(sampler.sample(&GazeInputs::head_only(head)).is_none());
    }

    #[test]
    fn test_opposed_eyes_fall_back_to_head() {
        let mut sampler = GazeSampler::new(true);
        let head = PoseSample::new(Point3D::ORIGIN, Vector3D::UP);
        let inputs = GazeInputs::binocular(eye(-0.03, Vector3D::FORWARD), eye(0.03, -Vector3D::FORWARD))
            .with_head(head);

        let sample = sampler.sample(&inputs).unwrap();
        assert_eq!(sample.source, GazeSource::Head);
    }

    #[test]
    fn test_cursor_point() {
        let mut sampler = GazeSampler::default();
        let head = PoseSample::new(Point3D::ORIGIN, Vector3D::FORWARD);
        let sample = sampler.sample(&GazeInputs::head_only(head)).unwrap();
        assert_eq!(sample.cursor(2.0), Point3D::new(0.0, 0.0, 2.0));
    }
}
