//! Append-only CSV event logs

mod event_log;
mod rows;

pub use event_log::{stamped_file_name, CsvRecord, EventLog, LogError};
pub use rows::{DwellRow, FixationPhase, FixationRow, GazeSampleRow, TrialRow};
