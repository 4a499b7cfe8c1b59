//! Scripted binocular gaze for development without eye-tracking hardware
//!
//! Fixates each point in turn for a fixed time, optionally glancing
//! straight up between points so dwell streaks are broken.

use super::{GazeInputs, PoseSample};
use crate::spatial::{Point3D, Vector3D};

/// Typical adult interpupillary distance in metres
const DEFAULT_IPD: f32 = 0.064;

#[derive(Debug, Clone)]
pub struct ScanSimulator {
    points: Vec<Point3D>,
    ipd: f32,
    fixation: f64,
    gap: f64,
    tick_rate: f64,
}

impl ScanSimulator {
    /// Scan `points` in order, `fixation` seconds each, at 60 Hz
    pub fn new(points: Vec<Point3D>, fixation: f64) -> Self {
        Self {
            points,
            ipd: DEFAULT_IPD,
            fixation: fixation.max(0.0),
            gap: 0.0,
            tick_rate: 60.0,
        }
    }

    /// Look up for `gap` seconds between points
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap.max(0.0);
        self
    }

    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        if hz > 0.0 {
            self.tick_rate = hz;
        }
        self
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Time to visit every point once
    pub fn duration(&self) -> f64 {
        self.points.len() as f64 * (self.fixation + self.gap)
    }

    /// Index of the point being fixated at `t`, if any
    pub fn fixated_index(&self, t: f64) -> Option<usize> {
        let period = self.fixation + self.gap;
        if t < 0.0 || period <= 0.0 {
            return None;
        }
        let index = (t / period).floor() as usize;
        let within = t - index as f64 * period;
        (index < self.points.len() && within < self.fixation).then_some(index)
    }

    /// Both eyes converging on the current point, or looking up during gaps
    pub fn inputs_at(&self, t: f64) -> GazeInputs {
        let half = Vector3D::new(self.ipd * 0.5, 0.0, 0.0);
        let left_pos = Point3D::ORIGIN + (-half);
        let right_pos = Point3D::ORIGIN + half;

        match self.fixated_index(t).and_then(|i| self.points.get(i)) {
            Some(&point) => GazeInputs::binocular(
                PoseSample::looking_at(left_pos, point),
                PoseSample::looking_at(right_pos, point),
            ),
            None => GazeInputs::binocular(
                PoseSample::new(left_pos, Vector3D::UP),
                PoseSample::new(right_pos, Vector3D::UP),
            ),
        }
    }

    /// Fixed-rate ticks from 0 through the end of the scan
    pub fn ticks(&self) -> impl Iterator<Item = (f64, GazeInputs)> + '_ {
        let steps = (self.duration() * self.tick_rate).ceil() as usize;
        (0..=steps).map(move |i| {
            let t = i as f64 / self.tick_rate;
            (t, self.inputs_at(t))
        })
    }
}
