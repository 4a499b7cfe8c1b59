//! gazeflow-core: gaze dwell and reaction-time trial engine
//!
//! This crate turns per-tick eye and head poses into:
//! - a single gaze ray (binocular average with single-eye and head fallback)
//! - the nearest lookable target under that ray
//! - one-shot dwell activations and sequential reaction-time trials
//! - session statistics and CSV event logs
//!
//! The engine is host independent. Hosts feed `now` (seconds) and
//! [`GazeInputs`] into a session's `tick` and react to the returned
//! [`GazeEvent`]s.

pub mod dwell;
pub mod event;
pub mod input;
pub mod layout;
pub mod log;
pub mod script;
pub mod session;
pub mod spatial;
pub mod stats;
pub mod target;
pub mod trial;

// Re-export commonly used types
pub use dwell::{DwellCompletion, DwellEvent, DwellState, DwellTracker};
pub use event::{GazeEvent, SkipReason, TickOutcome};
pub use input::{GazeInputs, GazeSample, GazeSampler, GazeSource, PoseSample, ScanSimulator};
pub use layout::{DistanceSchedule, TileLayout};
pub use log::{CsvRecord, EventLog, LogError};
pub use script::{ScriptError, ScriptTick};
pub use session::{CursorLogger, FixationLogger, MosaicSession, StarTest};
pub use spatial::{Bounds, Point3D, Ray, Vector3D};
pub use stats::{SessionStats, SessionSummary};
pub use target::{HitTest, LayerMask, RayHit, Target, TargetId, TargetRegistry, TargetResolver};
pub use trial::{TrialRecord, TrialSequencer, TrialState};
