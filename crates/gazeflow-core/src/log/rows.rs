//! Row schemas for the four session logs

use std::fmt;

use super::CsvRecord;
use crate::dwell::DwellCompletion;
use crate::spatial::Point3D;
use crate::target::TargetId;
use crate::trial::TrialRecord;

/// Periodic cursor sample from the eye-controlled cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSampleRow {
    pub time: f64,
    pub cursor: Point3D,
    pub convergence_deg: f32,
}

impl CsvRecord for GazeSampleRow {
    const HEADER: &'static str = "time,cursorX,cursorY,cursorZ,convergenceAngleDeg";

    fn to_csv_line(&self) -> String {
        format!(
            "{:.3},{:.4},{:.4},{:.4},{:.2}",
            self.time, self.cursor.x, self.cursor.y, self.cursor.z, self.convergence_deg
        )
    }
}

/// One completed tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellRow {
    pub tile_index: TargetId,
    pub first_look_time: f64,
    pub dwell_duration: f64,
}

impl From<DwellCompletion> for DwellRow {
    fn from(completion: DwellCompletion) -> Self {
        Self {
            tile_index: completion.target,
            first_look_time: completion.first_look_time,
            dwell_duration: completion.dwell_duration,
        }
    }
}

impl CsvRecord for DwellRow {
    const HEADER: &'static str = "tileIndex,firstLookTime,dwellDuration";

    fn to_csv_line(&self) -> String {
        format!(
            "{},{:.3},{:.3}",
            self.tile_index, self.first_look_time, self.dwell_duration
        )
    }
}

/// One reaction-time trial; missed trials leave the timing fields empty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialRow(pub TrialRecord);

impl From<TrialRecord> for TrialRow {
    fn from(record: TrialRecord) -> Self {
        Self(record)
    }
}

fn optional_secs(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_default()
}

impl CsvRecord for TrialRow {
    const HEADER: &'static str = "starIndex,startTime,firstLookTime,reactionTime,hit";

    fn to_csv_line(&self) -> String {
        let record = &self.0;
        format!(
            "{},{:.3},{},{},{}",
            record.target_index,
            record.start_time,
            optional_secs(record.first_look_time),
            optional_secs(record.reaction_time),
            record.hit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixationPhase {
    Start,
    Stop,
}

impl fmt::Display for FixationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixationPhase::Start => write!(f, "Start"),
            FixationPhase::Stop => write!(f, "Stop"),
        }
    }
}

/// Start/stop marker for fixation on a single watched point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixationRow {
    pub timestamp: f64,
    pub phase: FixationPhase,
    pub fixation_time: f64,
}

impl FixationRow {
    pub fn start(timestamp: f64) -> Self {
        Self {
            timestamp,
            phase: FixationPhase::Start,
            fixation_time: 0.0,
        }
    }

    pub fn stop(timestamp: f64, fixation_time: f64) -> Self {
        Self {
            timestamp,
            phase: FixationPhase::Stop,
            fixation_time,
        }
    }
}

impl CsvRecord for FixationRow {
    const HEADER: &'static str = "timestamp,event,fixationTime";

    fn to_csv_line(&self) -> String {
        match self.phase {
            FixationPhase::Start => format!("{:.3},{},0", self.timestamp, self.phase),
            FixationPhase::Stop => format!(
                "{:.3},{},{:.3}",
                self.timestamp, self.phase, self.fixation_time
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaze_sample_precision() {
        let row = GazeSampleRow {
            time: 1.25,
            cursor: Point3D::new(0.1, -0.25, 2.0),
            convergence_deg: 3.456,
        };
        assert_eq!(row.to_csv_line(), "1.250,0.1000,-0.2500,2.0000,3.46");
    }

    #[test]
    fn test_dwell_row_from_completion() {
        let row = DwellRow::from(DwellCompletion {
            target: 3,
            first_look_time: 2.5,
            dwell_duration: 0.75,
        });
        assert_eq!(row.to_csv_line(), "3,2.500,0.750");
    }

    #[test]
    fn test_trial_row_hit_and_miss() {
        let hit = TrialRow(TrialRecord {
            target_index: 0,
            start_time: 0.0,
            first_look_time: Some(1.5),
            reaction_time: Some(1.5),
            hit: true,
        });
        assert_eq!(hit.to_csv_line(), "0,0.000,1.500,1.500,true");

        let miss = TrialRow(TrialRecord {
            target_index: 1,
            start_time: 1.5,
            first_look_time: None,
            reaction_time: None,
            hit: false,
        });
        assert_eq!(miss.to_csv_line(), "1,1.500,,,false");
    }

    #[test]
    fn test_fixation_rows() {
        assert_eq!(FixationRow::start(0.5).to_csv_line(), "0.500,Start,0");
        assert_eq!(FixationRow::stop(2.0, 1.5).to_csv_line(), "2.000,Stop,1.500");
    }
}
