//! Reaction-time test over a sequence of star targets

use tracing::info;

use super::build_sampler;
use crate::event::{SkipReason, TickOutcome};
use crate::input::{GazeInputs, GazeSampler};
use crate::log::{EventLog, TrialRow};
use crate::target::{LayerMask, TargetRegistry, TargetResolver};
use crate::trial::{TrialEvent, TrialSequencer, TrialState};

#[derive(Debug, Clone, PartialEq)]
pub struct StarTestSettings {
    pub max_ray_distance: f32,
    pub layer_mask: LayerMask,
    /// Seconds to wait for gaze before a star counts as missed
    pub timeout: f64,
    pub use_head_fallback: bool,
    pub smoothing: Option<f32>,
}

impl Default for StarTestSettings {
    fn default() -> Self {
        Self {
            max_ray_distance: 10.0,
            layer_mask: LayerMask::NONE,
            timeout: 3.0,
            use_head_fallback: false, // eye tracking only
            smoothing: None,
        }
    }
}

/// Stars are armed in registration order, one at a time
#[derive(Debug, Clone)]
pub struct StarTest {
    targets: TargetRegistry,
    sampler: GazeSampler,
    resolver: TargetResolver,
    sequencer: TrialSequencer,
    log: EventLog<TrialRow>,
}

impl StarTest {
    pub fn new(targets: TargetRegistry, settings: StarTestSettings) -> Self {
        Self {
            sampler: build_sampler(settings.use_head_fallback, settings.smoothing),
            resolver: TargetResolver::new(settings.max_ray_distance, settings.layer_mask),
            sequencer: TrialSequencer::new(targets.ids(), settings.timeout),
            log: EventLog::new(),
            targets,
        }
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn sequencer(&self) -> &TrialSequencer {
        &self.sequencer
    }

    pub fn log(&self) -> &EventLog<TrialRow> {
        &self.log
    }

    pub fn is_finished(&self) -> bool {
        self.sequencer.is_finished()
    }

    /// Arm the first star
    pub fn start(&mut self, now: f64) -> TickOutcome {
        info!("Star test started with {} stars", self.targets.len());
        let events = self.sequencer.start(now);
        self.apply(events)
    }

    pub fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        if !matches!(self.sequencer.state(), TrialState::WaitingForGaze { .. }) {
            return TickOutcome::default();
        }

        let eyes_wired = inputs.has_both_eyes();
        let head_wired = self.sampler.uses_head_fallback() && inputs.head.is_some();
        if !eyes_wired && !head_wired {
            return TickOutcome::skipped(SkipReason::MissingInput("eye pose"));
        }
        let Some(sample) = self.sampler.sample(inputs) else {
            return TickOutcome::skipped(SkipReason::NoValidGaze);
        };

        let hit = self
            .resolver
            .resolve(&sample.ray, &self.targets)
            .map(|hit| hit.target);
        let events = self.sequencer.tick(now, hit);
        self.apply(events)
    }

    /// Back to waiting for `start` with an empty log
    pub fn reset(&mut self) {
        self.sequencer.reset();
        self.sampler.reset();
        self.log.clear();
    }

    fn apply(&mut self, events: Vec<TrialEvent>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        for event in events {
            if let TrialEvent::Recorded(record) = event {
                self.log.append(TrialRow::from(record));
            }
            if event == TrialEvent::Finished {
                info!("Star test finished: {} trials", self.log.len());
            }
            outcome.push(event);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GazeEvent;
    use crate::input::PoseSample;
    use crate::spatial::Point3D;

    fn stars() -> TargetRegistry {
        TargetRegistry::from_points(
            &[Point3D::new(0.0, 0.0, 5.0), Point3D::new(0.0, 5.0, 0.0)],
            0.5,
            0,
        )
    }

    fn looking_at(point: Point3D) -> GazeInputs {
        let eye = PoseSample::looking_at(Point3D::ORIGIN, point);
        GazeInputs::binocular(eye, eye)
    }

    #[test]
    fn test_hit_then_timeout() {
        let mut test = StarTest::new(stars(), StarTestSettings::default());
        let started = test.start(0.0);
        assert!(matches!(started.events[0], GazeEvent::TrialArmed { index: 0, .. }));

        let outcome = test.tick(0.4, &looking_at(Point3D::new(0.0, 0.0, 5.0)));
        assert!(matches!(outcome.events[0], GazeEvent::TrialEnded(r) if r.hit));
        assert!(matches!(outcome.events[1], GazeEvent::TrialArmed { index: 1, .. }));

        let away = looking_at(Point3D::new(5.0, 0.0, 0.0));
        assert!(test.tick(3.3, &away).events.is_empty());
        let outcome = test.tick(3.5, &away);
        assert!(outcome.events.contains(&GazeEvent::TrialsFinished));
        assert!(test.is_finished());

        let lines: Vec<String> = test
            .log()
            .rows()
            .iter()
            .map(crate::log::CsvRecord::to_csv_line)
            .collect();
        assert_eq!(lines, vec!["0,0.000,0.400,0.400,true", "1,0.400,,,false"]);
    }

    #[test]
    fn test_head_alone_is_missing_input() {
        let mut test = StarTest::new(stars(), StarTestSettings::default());
        test.start(0.0);
        let head = PoseSample::looking_at(Point3D::ORIGIN, Point3D::new(0.0, 0.0, 5.0));
        let outcome = test.tick(0.1, &GazeInputs::head_only(head));
        assert_eq!(outcome.skipped, Some(SkipReason::MissingInput("eye pose")));
        assert!(test.log().is_empty());
    }

    #[test]
    fn test_ticks_before_start_do_nothing() {
        let mut test = StarTest::new(stars(), StarTestSettings::default());
        let outcome = test.tick(1.0, &looking_at(Point3D::new(0.0, 0.0, 5.0)));
        assert_eq!(outcome, TickOutcome::default());
    }
}
