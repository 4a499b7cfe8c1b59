//! Recorded gaze scripts: one JSON object per line
//!
//! ```text
//! # t is seconds since recording start
//! {"t": 0.0, "left": {...}, "right": {...}, "head": {...}}
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::input::GazeInputs;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to read gaze script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid gaze script line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Gaze script line {line}: time {t} is earlier than previous {previous}")]
    TimeWentBackwards { line: usize, t: f64, previous: f64 },
}

/// Pose inputs for one tick at time `t`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptTick {
    pub t: f64,
    #[serde(flatten)]
    pub inputs: GazeInputs,
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptTick>, ScriptError> {
    let file = File::open(path)?;
    read_script(BufReader::new(file))
}

/// Parse a whole script; blank lines and `#` comments are skipped
pub fn read_script<R: BufRead>(reader: R) -> Result<Vec<ScriptTick>, ScriptError> {
    let mut ticks: Vec<ScriptTick> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let line_no = index + 1;
        let tick: ScriptTick = serde_json::from_str(trimmed).map_err(|source| ScriptError::Parse {
            line: line_no,
            source,
        })?;

        if let Some(previous) = ticks.last() {
            if tick.t < previous.t {
                return Err(ScriptError::TimeWentBackwards {
                    line: line_no,
                    t: tick.t,
                    previous: previous.t,
                });
            }
        }
        ticks.push(tick);
    }

    Ok(ticks)
}
