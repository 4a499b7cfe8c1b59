//! Uniform driver interface over the four session kinds

use std::path::{Path, PathBuf};

use gazeflow_core::log::LogError;
use gazeflow_core::{
    CursorLogger, FixationLogger, GazeInputs, MosaicSession, StarTest, TickOutcome,
};

/// A session the driver can feed ticks into and flush at the end
pub trait Replay {
    fn name(&self) -> &'static str;

    /// Called once with the first tick time
    fn begin(&mut self, _now: f64) -> TickOutcome {
        TickOutcome::default()
    }

    fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome;

    /// Whether further ticks would be no-ops
    fn is_done(&self) -> bool {
        false
    }

    fn rows(&self) -> usize;

    fn save(&self, dir: &Path) -> Result<PathBuf, LogError>;

    /// Human readable result printed after the run
    fn report(&self, _now: f64) -> Option<String> {
        None
    }
}

pub struct MosaicReplay {
    pub session: MosaicSession,
    pub file_name: String,
}

impl Replay for MosaicReplay {
    fn name(&self) -> &'static str {
        "mosaic"
    }

    fn begin(&mut self, now: f64) -> TickOutcome {
        self.session.restart(now);
        TickOutcome::default()
    }

    fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        self.session.tick(now, inputs)
    }

    fn is_done(&self) -> bool {
        self.session.is_ended()
    }

    fn rows(&self) -> usize {
        self.session.log().len()
    }

    fn save(&self, dir: &Path) -> Result<PathBuf, LogError> {
        self.session.log().save(dir, &self.file_name)
    }

    fn report(&self, now: f64) -> Option<String> {
        Some(self.session.summary(now).to_string())
    }
}

pub struct StarReplay {
    pub test: StarTest,
    pub file_name: String,
}

impl Replay for StarReplay {
    fn name(&self) -> &'static str {
        "stars"
    }

    fn begin(&mut self, now: f64) -> TickOutcome {
        self.test.reset();
        self.test.start(now)
    }

    fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        self.test.tick(now, inputs)
    }

    fn is_done(&self) -> bool {
        self.test.is_finished()
    }

    fn rows(&self) -> usize {
        self.test.log().len()
    }

    fn save(&self, dir: &Path) -> Result<PathBuf, LogError> {
        self.test.log().save(dir, &self.file_name)
    }

    fn report(&self, _now: f64) -> Option<String> {
        let records = self.test.sequencer().records();
        let hits: Vec<f64> = records.iter().filter_map(|r| r.reaction_time).collect();
        let mean = if hits.is_empty() {
            0.0
        } else {
            hits.iter().sum::<f64>() / hits.len() as f64
        };
        Some(format!(
            "Stars hit: {} / {} (mean reaction {:.3}s)",
            hits.len(),
            self.test.targets().len(),
            mean
        ))
    }
}

pub struct CursorReplay {
    pub logger: CursorLogger,
    pub file_name: String,
}

impl Replay for CursorReplay {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        self.logger.tick(now, inputs)
    }

    fn rows(&self) -> usize {
        self.logger.log().len()
    }

    fn save(&self, dir: &Path) -> Result<PathBuf, LogError> {
        self.logger.log().save(dir, &self.file_name)
    }
}

pub struct FixationReplay {
    pub logger: FixationLogger,
    pub file_name: String,
}

impl Replay for FixationReplay {
    fn name(&self) -> &'static str {
        "fixation"
    }

    fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        self.logger.tick(now, inputs)
    }

    fn rows(&self) -> usize {
        self.logger.log().len()
    }

    fn save(&self, dir: &Path) -> Result<PathBuf, LogError> {
        self.logger.log().save(dir, &self.file_name)
    }
}
