//! Head-ray fixation on a single watched point

use tracing::debug;

use crate::event::{GazeEvent, SkipReason, TickOutcome};
use crate::input::GazeInputs;
use crate::log::{EventLog, FixationRow};
use crate::spatial::Point3D;

#[derive(Debug, Clone, PartialEq)]
pub struct FixationSettings {
    /// Looking when `dot(forward, to_target) > 1 - hit_radius`
    pub hit_radius: f32,
}

impl Default for FixationSettings {
    fn default() -> Self {
        Self { hit_radius: 0.3 }
    }
}

#[derive(Debug, Clone)]
pub struct FixationLogger {
    target: Point3D,
    settings: FixationSettings,
    looking: bool,
    fixation_time: f64,
    last_tick: Option<f64>,
    log: EventLog<FixationRow>,
}

impl FixationLogger {
    pub fn new(target: Point3D, settings: FixationSettings) -> Self {
        Self {
            target,
            settings,
            looking: false,
            fixation_time: 0.0,
            last_tick: None,
            log: EventLog::new(),
        }
    }

    pub fn target(&self) -> Point3D {
        self.target
    }

    /// Time accumulated in the current fixation
    pub fn fixation_time(&self) -> f64 {
        self.fixation_time
    }

    pub fn log(&self) -> &EventLog<FixationRow> {
        &self.log
    }

    pub fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        let Some(head) = inputs.head else {
            return TickOutcome::skipped(SkipReason::MissingInput("head pose"));
        };
        if !head.active || head.forward.is_degenerate() {
            return TickOutcome::skipped(SkipReason::NoValidGaze);
        }

        let to_target = (self.target - head.position).normalize();
        let looking_now = head.forward.normalize().dot(&to_target) > 1.0 - self.settings.hit_radius;

        let dt = self.last_tick.map(|t| (now - t).max(0.0)).unwrap_or(0.0);
        self.last_tick = Some(now);

        let mut outcome = TickOutcome::default();
        if looking_now {
            if !self.looking {
                self.looking = true;
                self.fixation_time = 0.0;
                debug!("Started looking at target");
                self.log.append(FixationRow::start(now));
                outcome.push(GazeEvent::FixationStart { at: now });
            }
            self.fixation_time += dt;
        } else if self.looking {
            self.looking = false;
            debug!("Stopped looking at target after {:.2}s", self.fixation_time);
            self.log.append(FixationRow::stop(now, self.fixation_time));
            outcome.push(GazeEvent::FixationStop {
                at: now,
                duration: self.fixation_time,
            });
            self.fixation_time = 0.0;
        }
        outcome
    }

    pub fn reset(&mut self) {
        self.looking = false;
        self.fixation_time = 0.0;
        self.last_tick = None;
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PoseSample;
    use crate::log::CsvRecord;
    use crate::spatial::Vector3D;

    fn head(forward: Vector3D) -> GazeInputs {
        GazeInputs::head_only(PoseSample::new(Point3D::ORIGIN, forward))
    }

    #[test]
    fn test_start_and_stop_rows() {
        let mut logger = FixationLogger::new(Point3D::new(0.0, 0.0, 4.0), FixationSettings::default());

        assert!(logger.tick(0.0, &head(Vector3D::RIGHT)).events.is_empty());
        let start = logger.tick(0.5, &head(Vector3D::FORWARD));
        assert_eq!(start.events, vec![GazeEvent::FixationStart { at: 0.5 }]);
        logger.tick(1.0, &head(Vector3D::FORWARD));
        logger.tick(1.5, &head(Vector3D::FORWARD));
        let stop = logger.tick(2.0, &head(Vector3D::UP));
        assert_eq!(
            stop.events,
            vec![GazeEvent::FixationStop { at: 2.0, duration: 1.5 }]
        );

        let lines: Vec<String> = logger.log().rows().iter().map(|r| r.to_csv_line()).collect();
        assert_eq!(lines, vec!["0.500,Start,0", "2.000,Stop,1.500"]);
    }

    #[test]
    fn test_missing_head() {
        let mut logger = FixationLogger::new(Point3D::new(0.0, 0.0, 4.0), FixationSettings::default());
        let outcome = logger.tick(0.0, &GazeInputs::default());
        assert_eq!(outcome.skipped, Some(SkipReason::MissingInput("head pose")));
    }
}
