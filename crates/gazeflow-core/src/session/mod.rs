//! Sessions wire sampler, resolver, trackers and logs behind one `tick`

mod cursor;
mod fixation;
mod mosaic;
mod stars;

pub use cursor::{CursorLogger, CursorSettings};
pub use fixation::{FixationLogger, FixationSettings};
pub use mosaic::{MosaicSession, MosaicSettings};
pub use stars::{StarTest, StarTestSettings};

use crate::input::GazeSampler;

fn build_sampler(use_head_fallback: bool, smoothing: Option<f32>) -> GazeSampler {
    let sampler = GazeSampler::new(use_head_fallback);
    match smoothing {
        Some(alpha) => sampler.with_smoothing(alpha),
        None => sampler,
    }
}
