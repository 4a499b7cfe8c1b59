//! Eye-controlled cursor with periodic position and convergence samples

use tracing::debug;

use crate::event::{SkipReason, TickOutcome};
use crate::input::{GazeInputs, GazeSample};
use crate::log::{EventLog, GazeSampleRow};
use crate::spatial::Point3D;

#[derive(Debug, Clone, PartialEq)]
pub struct CursorSettings {
    /// Metres in front of the eyes
    pub cursor_distance: f32,
    /// Seconds between logged samples
    pub sample_interval: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            cursor_distance: 2.0,
            sample_interval: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CursorLogger {
    settings: CursorSettings,
    timer: f64,
    last_tick: Option<f64>,
    cursor: Option<Point3D>,
    log: EventLog<GazeSampleRow>,
}

impl CursorLogger {
    pub fn new(settings: CursorSettings) -> Self {
        Self {
            settings,
            timer: 0.0,
            last_tick: None,
            cursor: None,
            log: EventLog::new(),
        }
    }

    /// Where the cursor was placed on the last valid tick
    pub fn cursor(&self) -> Option<Point3D> {
        self.cursor
    }

    pub fn log(&self) -> &EventLog<GazeSampleRow> {
        &self.log
    }

    pub fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        let (Some(left), Some(right)) = (inputs.left, inputs.right) else {
            return TickOutcome::skipped(SkipReason::MissingInput("eye pose"));
        };
        if !inputs.any_eye_active() {
            return TickOutcome::skipped(SkipReason::NoValidGaze);
        }
        let Some(sample) = GazeSample::binocular(&left, &right) else {
            return TickOutcome::skipped(SkipReason::NoValidGaze);
        };

        let cursor = sample.cursor(self.settings.cursor_distance);
        self.cursor = Some(cursor);

        let dt = self.last_tick.map(|t| (now - t).max(0.0)).unwrap_or(0.0);
        self.last_tick = Some(now);
        self.timer += dt;

        if self.timer >= self.settings.sample_interval {
            self.timer = 0.0;
            let convergence_deg = sample.convergence_deg.unwrap_or(0.0);
            debug!(
                "Eye sample pos=({:.2},{:.2},{:.2}) angle={:.2}",
                cursor.x, cursor.y, cursor.z, convergence_deg
            );
            self.log.append(GazeSampleRow {
                time: now,
                cursor,
                convergence_deg,
            });
        }

        TickOutcome::default()
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.last_tick = None;
        self.cursor = None;
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PoseSample;
    use crate::log::CsvRecord;
    use crate::spatial::Vector3D;

    fn eyes() -> GazeInputs {
        GazeInputs::binocular(
            PoseSample::new(Point3D::new(-0.03, 0.0, 0.0), Vector3D::FORWARD),
            PoseSample::new(Point3D::new(0.03, 0.0, 0.0), Vector3D::FORWARD),
        )
    }

    #[test]
    fn test_samples_every_interval() {
        let mut logger = CursorLogger::new(CursorSettings::default());
        for now in [0.0, 0.125, 0.25, 0.375, 0.5] {
            logger.tick(now, &eyes());
        }

        let lines: Vec<String> = logger.log().rows().iter().map(|r| r.to_csv_line()).collect();
        assert_eq!(
            lines,
            vec![
                "0.250,0.0000,0.0000,2.0000,0.00",
                "0.500,0.0000,0.0000,2.0000,0.00",
            ]
        );
    }

    #[test]
    fn test_needs_both_eye_slots() {
        let mut logger = CursorLogger::new(CursorSettings::default());
        let left = PoseSample::new(Point3D::ORIGIN, Vector3D::FORWARD);
        let inputs = GazeInputs {
            left: Some(left),
            ..GazeInputs::default()
        };
        let outcome = logger.tick(0.0, &inputs);
        assert_eq!(outcome.skipped, Some(SkipReason::MissingInput("eye pose")));
        assert!(logger.cursor().is_none());
    }

    #[test]
    fn test_one_active_eye_still_drives_cursor() {
        let mut logger = CursorLogger::new(CursorSettings::default());
        let mut inputs = eyes();
        inputs.left = inputs.left.map(PoseSample::inactive);
        let outcome = logger.tick(0.0, &inputs);
        assert!(outcome.skipped.is_none());
        assert!(logger.cursor().is_some());
    }
}
