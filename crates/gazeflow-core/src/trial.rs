//! Sequential reaction-time trials over an ordered list of targets

use tracing::{debug, info};

use crate::target::TargetId;

/// Where the sequencer is in its run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrialState {
    #[default]
    WaitingForStart,
    /// Target at `index` is armed and waiting to be looked at
    WaitingForGaze { index: usize, started_at: f64 },
    Finished,
}

/// Outcome of one trial, appended exactly once when it ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialRecord {
    pub target_index: usize,
    pub start_time: f64,
    pub first_look_time: Option<f64>,
    pub reaction_time: Option<f64>,
    pub hit: bool,
}

/// Transitions produced by [`TrialSequencer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialEvent {
    Armed {
        index: usize,
        target: TargetId,
        at: f64,
    },
    Recorded(TrialRecord),
    /// Every target has been tried; the log should be flushed
    Finished,
}

/// Arms targets one after another, each with the same timeout
#[derive(Debug, Clone)]
pub struct TrialSequencer {
    targets: Vec<TargetId>,
    timeout: f64,
    state: TrialState,
    records: Vec<TrialRecord>,
}

impl TrialSequencer {
    pub fn new(targets: Vec<TargetId>, timeout: f64) -> Self {
        Self {
            targets,
            timeout: timeout.max(0.0),
            state: TrialState::WaitingForStart,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn is_finished(&self) -> bool {
        self.state == TrialState::Finished
    }

    /// Arm the first target. Ignored unless waiting to start.
    pub fn start(&mut self, now: f64) -> Vec<TrialEvent> {
        if self.state != TrialState::WaitingForStart {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.arm(0, now, &mut events);
        events
    }

    pub fn tick(&mut self, now: f64, hit: Option<TargetId>) -> Vec<TrialEvent> {
        let TrialState::WaitingForGaze { index, started_at } = self.state else {
            return Vec::new();
        };
        let Some(&armed) = self.targets.get(index) else {
            return Vec::new();
        };

        let record = if hit == Some(armed) {
            let reaction = now - started_at;
            info!("Trial {} hit in {:.3}s", index, reaction);
            TrialRecord {
                target_index: index,
                start_time: started_at,
                first_look_time: Some(now),
                reaction_time: Some(reaction),
                hit: true,
            }
        } else if now - started_at > self.timeout {
            info!("Trial {} missed (timeout)", index);
            TrialRecord {
                target_index: index,
                start_time: started_at,
                first_look_time: None,
                reaction_time: None,
                hit: false,
            }
        } else {
            return Vec::new();
        };

        self.records.push(record);
        let mut events = vec![TrialEvent::Recorded(record)];
        self.arm(index + 1, now, &mut events);
        events
    }

    /// Back to `WaitingForStart` with no records
    pub fn reset(&mut self) {
        self.state = TrialState::WaitingForStart;
        self.records.clear();
    }

    fn arm(&mut self, index: usize, now: f64, events: &mut Vec<TrialEvent>) {
        match self.targets.get(index) {
            Some(&target) => {
                debug!("Trial {} armed at t={:.3}", index, now);
                self.state = TrialState::WaitingForGaze {
                    index,
                    started_at: now,
                };
                events.push(TrialEvent::Armed {
                    index,
                    target,
                    at: now,
                });
            }
            None => {
                info!("All {} trials finished", self.targets.len());
                self.state = TrialState::Finished;
                events.push(TrialEvent::Finished);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut seq = TrialSequencer::new(vec![1, 2], 3.0);
        assert!(seq.tick(0.5, Some(1)).is_empty());
        assert_eq!(seq.state(), TrialState::WaitingForStart);
    }

    #[test]
    fn test_hit_records_reaction_time() {
        let mut seq = TrialSequencer::new(vec![10, 11], 3.0);
        let armed = seq.start(2.0);
        assert_eq!(
            armed,
            vec![TrialEvent::Armed {
                index: 0,
                target: 10,
                at: 2.0
            }]
        );

        assert!(seq.tick(2.5, Some(11)).is_empty());
        let events = seq.tick(3.25, Some(10));

        let TrialEvent::Recorded(record) = events[0] else {
            panic!("expected a record, got {:?}", events);
        };
        assert!(record.hit);
        assert_eq!(record.start_time, 2.0);
        assert_eq!(record.first_look_time, Some(3.25));
        assert_eq!(record.reaction_time, Some(3.25 - 2.0));
        assert_eq!(
            events[1],
            TrialEvent::Armed {
                index: 1,
                target: 11,
                at: 3.25
            }
        );
    }

    #[test]
    fn test_timeout_records_miss() {
        let mut seq = TrialSequencer::new(vec![0], 3.0);
        seq.start(1.0);
        assert!(seq.tick(4.0, None).is_empty());

        let events = seq.tick(4.5, None);
        assert_eq!(
            events,
            vec![
                TrialEvent::Recorded(TrialRecord {
                    target_index: 0,
                    start_time: 1.0,
                    first_look_time: None,
                    reaction_time: None,
                    hit: false,
                }),
                TrialEvent::Finished,
            ]
        );
        assert!(seq.is_finished());
    }

    #[test]
    fn test_runs_strictly_in_order() {
        let mut seq = TrialSequencer::new(vec![0, 1, 2], 1.0);
        seq.start(0.0);
        // Looking at a later target does not complete it early
        assert!(seq.tick(0.2, Some(2)).is_empty());
        seq.tick(0.3, Some(0));
        seq.tick(1.5, None);
        seq.tick(1.6, Some(2));

        let indices: Vec<usize> = seq.records().iter().map(|r| r.target_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            seq.records().iter().map(|r| r.hit).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert!(seq.is_finished());
        assert!(seq.tick(2.0, Some(2)).is_empty());
    }

    #[test]
    fn test_empty_sequence_finishes_on_start() {
        let mut seq = TrialSequencer::new(Vec::new(), 3.0);
        assert_eq!(seq.start(0.0), vec![TrialEvent::Finished]);
        assert!(seq.is_finished());
    }

    #[test]
    fn test_reset() {
        let mut seq = TrialSequencer::new(vec![0], 1.0);
        seq.start(0.0);
        seq.tick(0.1, Some(0));
        seq.reset();
        assert_eq!(seq.state(), TrialState::WaitingForStart);
        assert!(seq.records().is_empty());
        assert!(!seq.start(5.0).is_empty());
    }
}
