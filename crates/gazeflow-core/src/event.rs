//! Unified engine events returned from session ticks

use crate::dwell::{DwellCompletion, DwellEvent};
use crate::stats::SessionSummary;
use crate::target::TargetId;
use crate::trial::{TrialEvent, TrialRecord};

/// Everything a host may react to (highlight, sound, UI)
#[derive(Debug, Clone, PartialEq)]
pub enum GazeEvent {
    /// Gaze landed on a target
    GazeEnter { target_id: TargetId, at: f64 },

    /// Gaze left a target before completing it
    GazeExit { target_id: TargetId },

    /// Continuous gaze reached the dwell threshold
    DwellComplete(DwellCompletion),

    /// Next trial target is armed
    TrialArmed {
        index: usize,
        target_id: TargetId,
        at: f64,
    },

    /// A trial ended by hit or timeout
    TrialEnded(TrialRecord),

    /// The last trial ended
    TrialsFinished,

    /// Fixation on a watched point began
    FixationStart { at: f64 },

    /// Fixation on a watched point ended after `duration` seconds
    FixationStop { at: f64, duration: f64 },

    /// The dwell session ran out of time
    SessionEnded(SessionSummary),
}

impl From<DwellEvent> for GazeEvent {
    fn from(event: DwellEvent) -> Self {
        match event {
            DwellEvent::Entered { target, at } => GazeEvent::GazeEnter {
                target_id: target,
                at,
            },
            DwellEvent::Exited { target } => GazeEvent::GazeExit { target_id: target },
            DwellEvent::Completed(completion) => GazeEvent::DwellComplete(completion),
        }
    }
}

impl From<TrialEvent> for GazeEvent {
    fn from(event: TrialEvent) -> Self {
        match event {
            TrialEvent::Armed { index, target, at } => GazeEvent::TrialArmed {
                index,
                target_id: target,
                at,
            },
            TrialEvent::Recorded(record) => GazeEvent::TrialEnded(record),
            TrialEvent::Finished => GazeEvent::TrialsFinished,
        }
    }
}

/// Why a tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A required pose source is not wired up
    MissingInput(&'static str),
    /// No pose source is currently tracking
    NoValidGaze,
}

/// Result of a single session tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<GazeEvent>,
    pub skipped: Option<SkipReason>,
}

impl TickOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        tracing::debug!(?reason, "Tick skipped");
        Self {
            events: Vec::new(),
            skipped: Some(reason),
        }
    }

    pub fn push(&mut self, event: impl Into<GazeEvent>) {
        self.events.push(event.into());
    }
}
