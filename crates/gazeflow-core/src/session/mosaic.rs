//! Timed tile game: look at each tile long enough to activate it

use tracing::info;

use super::build_sampler;
use crate::dwell::{DwellEvent, DwellTracker};
use crate::event::{GazeEvent, SkipReason, TickOutcome};
use crate::input::{GazeInputs, GazeSampler};
use crate::log::{DwellRow, EventLog};
use crate::stats::{SessionStats, SessionSummary};
use crate::target::{LayerMask, TargetRegistry, TargetResolver};

/// Distance along the gaze ray at which movement metrics are sampled
const METRIC_CURSOR_DISTANCE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MosaicSettings {
    pub max_ray_distance: f32,
    pub layer_mask: LayerMask,
    /// Seconds of continuous gaze needed to activate a tile
    pub dwell_threshold: f64,
    /// Seconds until the session ends on its own
    pub session_duration: f64,
    pub use_head_fallback: bool,
    pub smoothing: Option<f32>,
}

impl Default for MosaicSettings {
    fn default() -> Self {
        Self {
            max_ray_distance: 10.0,
            layer_mask: LayerMask::NONE, // match everything
            dwell_threshold: 0.7,
            session_duration: 90.0,
            use_head_fallback: true,
            smoothing: None,
        }
    }
}

/// Gaze-activated tile session with a fixed duration
#[derive(Debug, Clone)]
pub struct MosaicSession {
    settings: MosaicSettings,
    targets: TargetRegistry,
    sampler: GazeSampler,
    resolver: TargetResolver,
    tracker: DwellTracker,
    stats: SessionStats,
    log: EventLog<DwellRow>,
}

impl MosaicSession {
    pub fn new(targets: TargetRegistry, settings: MosaicSettings, now: f64) -> Self {
        info!(
            "Mosaic session started with {} tiles ({}s)",
            targets.len(),
            settings.session_duration
        );
        Self {
            sampler: build_sampler(settings.use_head_fallback, settings.smoothing),
            resolver: TargetResolver::new(settings.max_ray_distance, settings.layer_mask),
            tracker: DwellTracker::new(settings.dwell_threshold),
            stats: SessionStats::new(now),
            log: EventLog::new(),
            targets,
            settings,
        }
    }

    pub fn settings(&self) -> &MosaicSettings {
        &self.settings
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn tracker(&self) -> &DwellTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn log(&self) -> &EventLog<DwellRow> {
        &self.log
    }

    pub fn is_ended(&self) -> bool {
        self.stats.ended
    }

    pub fn tick(&mut self, now: f64, inputs: &GazeInputs) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.stats.ended {
            return outcome;
        }

        if self.stats.elapsed(now) >= self.settings.session_duration {
            if let Some(exit) = self.tracker.release() {
                outcome.push(exit);
            }
            self.stats.ended = true;
            let summary = self.summary(now);
            info!("Mosaic session ended: {}/{} tiles", summary.completed, summary.total_targets);
            outcome.push(GazeEvent::SessionEnded(summary));
            return outcome;
        }

        if inputs.left.is_none() && inputs.right.is_none() && inputs.head.is_none() {
            return TickOutcome::skipped(SkipReason::MissingInput("gaze pose"));
        }
        let Some(sample) = self.sampler.sample(inputs) else {
            return TickOutcome::skipped(SkipReason::NoValidGaze);
        };

        self.stats
            .record_gaze(sample.cursor(METRIC_CURSOR_DISTANCE), now);

        let hit = self
            .resolver
            .resolve(&sample.ray, &self.targets)
            .map(|hit| hit.target);

        for event in self.tracker.tick(now, hit) {
            if let DwellEvent::Completed(completion) = event {
                self.log.append(DwellRow::from(completion));
                self.stats.record_completion(completion.dwell_duration);
            }
            outcome.push(event);
        }
        outcome
    }

    /// Start over at `now` with fresh progress, stats and log
    pub fn restart(&mut self, now: f64) {
        info!("Mosaic session restarted");
        self.tracker.reset();
        self.stats.reset(now);
        self.log.clear();
        self.sampler.reset();
    }

    pub fn summary(&self, now: f64) -> SessionSummary {
        self.stats.summary(now, self.targets.len())
    }
}
