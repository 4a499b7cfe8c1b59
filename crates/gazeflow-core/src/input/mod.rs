//! Input abstraction for gaze tracking
//!
//! Provides:
//! - Per-tick pose samples from the eyes and head
//! - Combination of those poses into a single gaze ray
//! - Optional direction smoothing
//! - A scripted scan simulator for running without hardware

mod gaze;
mod pose;
mod simulator;
mod smoothing;

pub use gaze::{GazeSample, GazeSampler, GazeSource};
pub use pose::{GazeInputs, PoseSample};
pub use simulator::ScanSimulator;
pub use smoothing::GazeSmoother;
