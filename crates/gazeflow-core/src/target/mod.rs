//! Lookable targets and gaze-to-target resolution

mod registry;
mod resolver;

pub use registry::{Target, TargetId, TargetRegistry};
pub use resolver::{HitTest, LayerMask, RayHit, TargetResolver};
