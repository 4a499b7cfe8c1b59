//! Dwell tracking: one-shot activation of targets by continuous gaze
//!
//! Only one target can accumulate dwell at a time. Looking away ends the
//! streak, so dwell is never summed across separate looks, while the
//! first-look timestamp of a target survives any number of interruptions.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::target::TargetId;

/// Slack for float noise when comparing a streak against the threshold
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Engine-wide dwell state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DwellState {
    /// No target under gaze
    #[default]
    Idle,
    /// Gaze has stayed on `target` since `since`
    Looking { target: TargetId, since: f64 },
}

/// Per-target bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetProgress {
    /// First tick the target was ever entered
    pub first_look: Option<f64>,
    /// Sticky until [`DwellTracker::reset`]
    pub completed: bool,
}

/// Emitted once per target when its dwell threshold is reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellCompletion {
    pub target: TargetId,
    pub first_look_time: f64,
    pub dwell_duration: f64,
}

/// Transitions produced by [`DwellTracker::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DwellEvent {
    Entered { target: TargetId, at: f64 },
    Exited { target: TargetId },
    Completed(DwellCompletion),
}

/// Idle -> Looking -> Completed state machine over all targets
#[derive(Debug, Clone)]
pub struct DwellTracker {
    threshold: f64,
    state: DwellState,
    progress: HashMap<TargetId, TargetProgress>,
}

impl DwellTracker {
    /// Tracker completing targets after `threshold` seconds of continuous gaze
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            state: DwellState::Idle,
            progress: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn state(&self) -> DwellState {
        self.state
    }

    pub fn progress(&self, target: TargetId) -> TargetProgress {
        self.progress.get(&target).copied().unwrap_or_default()
    }

    pub fn is_completed(&self, target: TargetId) -> bool {
        self.progress(target).completed
    }

    pub fn completed_count(&self) -> usize {
        self.progress.values().filter(|p| p.completed).count()
    }

    /// Advance the machine with this tick's resolved target
    pub fn tick(&mut self, now: f64, hit: Option<TargetId>) -> Vec<DwellEvent> {
        // Completed targets are inert: gazing at one counts as gazing at nothing
        let hit = hit.filter(|id| !self.is_completed(*id));
        let mut events = Vec::new();

        match (self.state, hit) {
            (DwellState::Looking { target, since }, Some(id)) if target == id => {
                let dwell = now - since;
                if dwell + THRESHOLD_EPSILON >= self.threshold {
                    events.push(DwellEvent::Completed(self.complete(target, since, dwell)));
                }
            }
            (state, Some(id)) => {
                if let DwellState::Looking { target, .. } = state {
                    debug!(from = target, to = id, "Gaze switched target");
                    events.push(DwellEvent::Exited { target });
                }
                events.push(self.enter(id, now));
            }
            (DwellState::Looking { target, .. }, None) => {
                self.state = DwellState::Idle;
                events.push(DwellEvent::Exited { target });
            }
            (DwellState::Idle, None) => {}
        }

        events
    }

    /// Drop the current target without completing it (session end)
    pub fn release(&mut self) -> Option<DwellEvent> {
        match std::mem::take(&mut self.state) {
            DwellState::Looking { target, .. } => Some(DwellEvent::Exited { target }),
            DwellState::Idle => None,
        }
    }

    /// Clear all completion and first-look state for a new session
    pub fn reset(&mut self) {
        self.state = DwellState::Idle;
        self.progress.clear();
    }

    fn enter(&mut self, target: TargetId, now: f64) -> DwellEvent {
        let progress = self.progress.entry(target).or_default();
        if progress.first_look.is_none() {
            progress.first_look = Some(now);
        }
        self.state = DwellState::Looking { target, since: now };
        DwellEvent::Entered { target, at: now }
    }

    fn complete(&mut self, target: TargetId, since: f64, dwell: f64) -> DwellCompletion {
        let progress = self.progress.entry(target).or_default();
        progress.completed = true;
        let first_look_time = progress.first_look.unwrap_or(since);
        self.state = DwellState::Idle;

        info!("Target {} dwell complete after {:.2}s", target, dwell);

        DwellCompletion {
            target,
            first_look_time,
            dwell_duration: dwell,
        }
    }
}
