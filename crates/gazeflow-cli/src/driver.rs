//! Feeds ticks into a session, optionally paced in real time

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use gazeflow_core::{GazeEvent, GazeInputs};

use crate::replay::Replay;

/// How ticks are spaced in wall-clock time
pub enum Pacing {
    /// As fast as possible
    Off,
    /// Sleep until each tick's timestamp relative to the first one
    Timestamps,
    /// Fixed-rate interval
    Fixed(Duration),
}

/// Where the run stopped and what was written
#[derive(Debug)]
pub struct RunReport {
    pub path: PathBuf,
    pub ticks: usize,
    pub last_time: f64,
    pub interrupted: bool,
    pub summary: Option<String>,
}

enum Pacer {
    Off,
    Timestamps { wall_start: Instant, t0: f64 },
    Fixed(Interval),
}

impl Pacer {
    fn new(pacing: Pacing, t0: f64) -> Self {
        match pacing {
            Pacing::Off => Pacer::Off,
            Pacing::Timestamps => Pacer::Timestamps {
                wall_start: Instant::now(),
                t0,
            },
            Pacing::Fixed(period) => {
                let mut interval = time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Pacer::Fixed(interval)
            }
        }
    }

    async fn wait(&mut self, t: f64) {
        match self {
            Pacer::Off => {}
            Pacer::Timestamps { wall_start, t0 } => match pacing_deadline(*wall_start, *t0, t) {
                Some(deadline) => time::sleep_until(deadline).await,
                None => warn!("Tick at t={} is out of pacing range, not waiting", t),
            },
            Pacer::Fixed(interval) => {
                interval.tick().await;
            }
        }
    }
}

/// Wall-clock instant for script time `t`, or `None` when it cannot be represented
fn pacing_deadline(wall_start: Instant, t0: f64, t: f64) -> Option<Instant> {
    let offset = Duration::try_from_secs_f64((t - t0).max(0.0)).ok()?;
    wall_start.checked_add(offset)
}

/// Run `ticks` through `replay`, then save its log into `out_dir`.
///
/// Ctrl-C stops the run early; the log is flushed either way. A failed
/// save is logged and retried once before giving up.
pub async fn drive<R, I>(replay: &mut R, ticks: I, pacing: Pacing, out_dir: &Path) -> Result<RunReport>
where
    R: Replay + ?Sized,
    I: IntoIterator<Item = (f64, GazeInputs)>,
{
    let mut ticks = ticks.into_iter().peekable();
    let t0 = ticks.peek().map(|(t, _)| *t).unwrap_or(0.0);

    info!("Starting {} run", replay.name());
    for event in replay.begin(t0).events {
        log_event(&event);
    }

    let mut pacer = Pacer::new(pacing, t0);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut count = 0;
    let mut last_time = t0;
    let mut interrupted = false;

    for (t, inputs) in ticks {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                warn!("Interrupted, flushing {} log", replay.name());
                interrupted = true;
                break;
            }
            _ = pacer.wait(t) => {}
        }

        let outcome = replay.tick(t, &inputs);
        for event in &outcome.events {
            log_event(event);
        }
        count += 1;
        last_time = t;

        if replay.is_done() {
            debug!("{} run finished at t={:.3}", replay.name(), t);
            break;
        }
    }

    let path = save_with_retry(replay, out_dir)?;
    info!("{} run wrote {} rows after {} ticks", replay.name(), replay.rows(), count);

    Ok(RunReport {
        path,
        ticks: count,
        last_time,
        interrupted,
        summary: replay.report(last_time),
    })
}

fn save_with_retry<R: Replay + ?Sized>(replay: &R, out_dir: &Path) -> Result<PathBuf> {
    match replay.save(out_dir) {
        Ok(path) => Ok(path),
        Err(e) => {
            error!("Saving {} log failed: {}", replay.name(), e);
            replay
                .save(out_dir)
                .with_context(|| format!("Failed to save {} log to {}", replay.name(), out_dir.display()))
        }
    }
}

fn log_event(event: &GazeEvent) {
    match event {
        GazeEvent::GazeEnter { target_id, at } => debug!("Gaze entered target {} at {:.3}", target_id, at),
        GazeEvent::GazeExit { target_id } => debug!("Gaze left target {}", target_id),
        GazeEvent::DwellComplete(c) => info!(
            "Tile {} activated (first look {:.3}, dwell {:.3}s)",
            c.target, c.first_look_time, c.dwell_duration
        ),
        GazeEvent::TrialArmed { index, target_id, at } => {
            debug!("Star {} (target {}) armed at {:.3}", index, target_id, at)
        }
        GazeEvent::TrialEnded(record) => match record.reaction_time {
            Some(reaction) => info!("Star {} hit in {:.3}s", record.target_index, reaction),
            None => info!("Star {} missed", record.target_index),
        },
        GazeEvent::TrialsFinished => info!("All stars done"),
        GazeEvent::FixationStart { at } => info!("Fixation started at {:.3}", at),
        GazeEvent::FixationStop { at, duration } => {
            info!("Fixation stopped at {:.3} after {:.3}s", at, duration)
        }
        GazeEvent::SessionEnded(summary) => info!(
            "Session ended: {} / {} tiles",
            summary.completed, summary.total_targets
        ),
    }
}
