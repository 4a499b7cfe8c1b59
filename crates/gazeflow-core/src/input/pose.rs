//! Pose samples delivered by the eye-tracking host

use serde::{Deserialize, Serialize};

use crate::spatial::{Point3D, Vector3D};

/// One tracked pose for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Whether the tracker currently reports this pose as valid
    #[serde(default = "default_active")]
    pub active: bool,
    pub position: Point3D,
    pub forward: Vector3D,
}

fn default_active() -> bool {
    true
}

impl PoseSample {
    /// An active pose
    pub fn new(position: Point3D, forward: Vector3D) -> Self {
        Self {
            active: true,
            position,
            forward,
        }
    }

    /// Same pose, flagged as not tracking
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Pose looking from `position` towards `target`
    pub fn looking_at(position: Point3D, target: Point3D) -> Self {
        Self::new(position, (target - position).normalize())
    }
}

/// Everything the host hands over for one tick.
///
/// A `None` slot means the host never wired that source up, which is
/// different from a wired source that is temporarily inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeInputs {
    #[serde(default)]
    pub left: Option<PoseSample>,
    #[serde(default)]
    pub right: Option<PoseSample>,
    #[serde(default)]
    pub head: Option<PoseSample>,
}

impl GazeInputs {
    /// Both eyes, no head pose
    pub fn binocular(left: PoseSample, right: PoseSample) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            head: None,
        }
    }

    /// Head pose only
    pub fn head_only(head: PoseSample) -> Self {
        Self {
            left: None,
            right: None,
            head: Some(head),
        }
    }

    pub fn with_head(mut self, head: PoseSample) -> Self {
        self.head = Some(head);
        self
    }

    /// Whether both eye slots are wired
    pub fn has_both_eyes(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Whether any eye slot is wired and currently tracking
    pub fn any_eye_active(&self) -> bool {
        self.left.map(|p| p.active).unwrap_or(false) || self.right.map(|p| p.active).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_defaults_to_active_when_deserialized() {
        let pose: PoseSample = serde_json::from_str(
            r#"{"position":{"x":0.0,"y":1.6,"z":0.0},"forward":{"x":0.0,"y":0.0,"z":1.0}}"#,
        )
        .unwrap();
        assert!(pose.active);
        assert_eq!(pose.forward, Vector3D::FORWARD);
    }

    #[test]
    fn test_looking_at() {
        let pose = PoseSample::looking_at(Point3D::ORIGIN, Point3D::new(0.0, 0.0, 10.0));
        assert_eq!(pose.forward, Vector3D::FORWARD);
    }

    #[test]
    fn test_any_eye_active() {
        let eye = PoseSample::new(Point3D::ORIGIN, Vector3D::FORWARD);
        assert!(!GazeInputs::default().any_eye_active());
        assert!(!GazeInputs::binocular(eye.inactive(), eye.inactive()).any_eye_active());
        assert!(GazeInputs::binocular(eye.inactive(), eye).any_eye_active());
    }
}
