//! Session statistics and the end-of-session summary

use std::collections::VecDeque;
use std::fmt;

use crate::spatial::Point3D;

/// How far back the gaze history reaches, in seconds
pub const GAZE_HISTORY_WINDOW: f64 = 10.0;

/// Cursor jumps shorter than this are treated as fixation jitter
const SACCADE_MIN_DISTANCE: f32 = 0.1;

/// Running counters for one dwell session
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub session_start: f64,
    pub ended: bool,
    pub completed_count: usize,
    pub dwell_sum: f64,
    gaze_history: VecDeque<(Point3D, f64)>,
    last_gaze: Option<(Point3D, f64)>,
    saccade_speed_sum: f64,
    saccade_count: usize,
    total_gaze_distance: f64,
}

impl SessionStats {
    pub fn new(session_start: f64) -> Self {
        Self {
            session_start,
            ended: false,
            completed_count: 0,
            dwell_sum: 0.0,
            gaze_history: VecDeque::with_capacity(600),
            last_gaze: None,
            saccade_speed_sum: 0.0,
            saccade_count: 0,
            total_gaze_distance: 0.0,
        }
    }

    /// Back to initial values for a session starting at `now`
    pub fn reset(&mut self, now: f64) {
        *self = Self::new(now);
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.session_start).max(0.0)
    }

    pub fn record_completion(&mut self, dwell_duration: f64) {
        self.completed_count += 1;
        self.dwell_sum += dwell_duration;
    }

    /// Record this tick's cursor point for movement metrics
    pub fn record_gaze(&mut self, point: Point3D, now: f64) {
        if let Some((last_point, last_time)) = self.last_gaze {
            let distance = last_point.distance(&point);
            let dt = now - last_time;
            if distance > SACCADE_MIN_DISTANCE && dt > 0.0 {
                self.saccade_speed_sum += f64::from(distance) / dt;
                self.saccade_count += 1;
                self.total_gaze_distance += f64::from(distance);
            }
        }
        self.last_gaze = Some((point, now));

        self.gaze_history.push_back((point, now));
        while let Some(&(_, t)) = self.gaze_history.front() {
            if now - t > GAZE_HISTORY_WINDOW {
                self.gaze_history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Gaze points from the last [`GAZE_HISTORY_WINDOW`] seconds, oldest first
    pub fn gaze_history(&self) -> impl Iterator<Item = &(Point3D, f64)> {
        self.gaze_history.iter()
    }

    pub fn average_dwell(&self) -> f64 {
        if self.completed_count == 0 {
            0.0
        } else {
            self.dwell_sum / self.completed_count as f64
        }
    }

    pub fn average_saccade_speed(&self) -> f64 {
        if self.saccade_count == 0 {
            0.0
        } else {
            self.saccade_speed_sum / self.saccade_count as f64
        }
    }

    pub fn saccade_count(&self) -> usize {
        self.saccade_count
    }

    pub fn total_gaze_distance(&self) -> f64 {
        self.total_gaze_distance
    }

    pub fn summary(&self, now: f64, total_targets: usize) -> SessionSummary {
        let completion_percent = if total_targets > 0 {
            self.completed_count as f64 / total_targets as f64 * 100.0
        } else {
            0.0
        };
        let elapsed = self.elapsed(now);
        let look_speed = if self.completed_count > 0 && elapsed > 0.0 {
            self.completed_count as f64 / elapsed
        } else {
            0.0
        };
        let focus_efficiency = if self.completed_count > 0 {
            self.completed_count as f64 / (self.saccade_count + 1) as f64
        } else {
            0.0
        };
        let average_saccade_speed = self.average_saccade_speed();

        SessionSummary {
            completed: self.completed_count,
            total_targets,
            average_dwell: self.average_dwell(),
            completion_percent,
            average_saccade_speed,
            total_gaze_distance: self.total_gaze_distance,
            look_speed,
            focus_efficiency,
            rating: PerformanceRating::from_percent(completion_percent),
            eye_movement: EyeMovement::from_speed(average_saccade_speed),
        }
    }
}

/// Coarse grade of a session by completion percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceRating {
    Excellent,
    Great,
    Good,
    NiceTry,
    KeepGoing,
}

impl PerformanceRating {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            Self::Excellent
        } else if percent >= 75.0 {
            Self::Great
        } else if percent >= 60.0 {
            Self::Good
        } else if percent >= 40.0 {
            Self::NiceTry
        } else {
            Self::KeepGoing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent!",
            Self::Great => "Great Job!",
            Self::Good => "Good Work!",
            Self::NiceTry => "Nice Try!",
            Self::KeepGoing => "Keep Going!",
        }
    }
}

/// How busy the eyes were, from the average saccade speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeMovement {
    Fast,
    Moderate,
    Calm,
}

impl EyeMovement {
    pub fn from_speed(units_per_sec: f64) -> Self {
        if units_per_sec > 5.0 {
            Self::Fast
        } else if units_per_sec > 2.0 {
            Self::Moderate
        } else {
            Self::Calm
        }
    }
}

/// End-of-session report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub completed: usize,
    pub total_targets: usize,
    pub average_dwell: f64,
    pub completion_percent: f64,
    /// Units per second
    pub average_saccade_speed: f64,
    pub total_gaze_distance: f64,
    /// Completions per second of session time
    pub look_speed: f64,
    pub focus_efficiency: f64,
    pub rating: PerformanceRating,
    pub eye_movement: EyeMovement,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tiles completed:   {} / {} ({:.0}%) {}",
            self.completed,
            self.total_targets,
            self.completion_percent,
            self.rating.label()
        )?;
        writeln!(f, "Average focus:     {:.2}s per tile", self.average_dwell)?;
        writeln!(f, "Look speed:        {:.2} tiles/sec", self.look_speed)?;
        if self.average_saccade_speed > 0.0 {
            writeln!(
                f,
                "Eye movement:      {:?} ({:.1} units/sec)",
                self.eye_movement, self.average_saccade_speed
            )?;
        }
        writeln!(f, "Total exploration: {:.1} units", self.total_gaze_distance)?;
        write!(f, "Focus efficiency:  {:.2}", self.focus_efficiency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_dwell() {
        let mut stats = SessionStats::new(0.0);
        assert_eq!(stats.average_dwell(), 0.0);
        stats.record_completion(0.75);
        stats.record_completion(1.25);
        assert_eq!(stats.average_dwell(), 1.0);
    }

    #[test]
    fn test_small_moves_are_not_saccades() {
        let mut stats = SessionStats::new(0.0);
        stats.record_gaze(Point3D::new(0.0, 0.0, 2.0), 0.1);
        stats.record_gaze(Point3D::new(0.05, 0.0, 2.0), 0.2);
        assert_eq!(stats.saccade_count(), 0);

        stats.record_gaze(Point3D::new(1.05, 0.0, 2.0), 0.7);
        assert_eq!(stats.saccade_count(), 1);
        assert!((stats.average_saccade_speed() - 2.0).abs() < 1e-4);
        assert!((stats.total_gaze_distance() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_gaze_history_window() {
        let mut stats = SessionStats::new(0.0);
        for i in 0..=30 {
            stats.record_gaze(Point3D::ORIGIN, i as f64);
        }
        let oldest = stats.gaze_history().next().unwrap().1;
        assert_eq!(oldest, 20.0);
        assert_eq!(stats.gaze_history().count(), 11);
    }

    #[test]
    fn test_summary() {
        let mut stats = SessionStats::new(10.0);
        stats.record_completion(1.0);
        stats.record_completion(0.8);
        stats.record_completion(0.9);
        stats.record_gaze(Point3D::ORIGIN, 11.0);
        stats.record_gaze(Point3D::new(1.0, 0.0, 0.0), 12.0);

        let summary = stats.summary(40.0, 4);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.completion_percent, 75.0);
        assert_eq!(summary.rating, PerformanceRating::Great);
        assert!((summary.average_dwell - 0.9).abs() < 1e-9);
        assert!((summary.look_speed - 0.1).abs() < 1e-9);
        assert!((summary.focus_efficiency - 1.5).abs() < 1e-9);
        assert_eq!(summary.eye_movement, EyeMovement::Calm);
        assert!(summary.to_string().contains("3 / 4 (75%) Great Job!"));
    }

    #[test]
    fn test_summary_without_targets() {
        let summary = SessionStats::new(0.0).summary(5.0, 0);
        assert_eq!(summary.completion_percent, 0.0);
        assert_eq!(summary.rating, PerformanceRating::KeepGoing);
        assert_eq!(summary.focus_efficiency, 0.0);
    }

    #[test]
    fn test_ratings() {
        assert_eq!(PerformanceRating::from_percent(100.0), PerformanceRating::Excellent);
        assert_eq!(PerformanceRating::from_percent(60.0), PerformanceRating::Good);
        assert_eq!(PerformanceRating::from_percent(39.9), PerformanceRating::KeepGoing);
        assert_eq!(EyeMovement::from_speed(5.5), EyeMovement::Fast);
        assert_eq!(EyeMovement::from_speed(3.0), EyeMovement::Moderate);
    }
}
