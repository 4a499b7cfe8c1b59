//! Target placement around the viewer
//!
//! All generators are pure functions of their parameters and the RNG, so a
//! seeded [`StdRng`] reproduces a layout exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::warn;

use crate::input::PoseSample;
use crate::spatial::{Point3D, Vector3D};

/// Random offset applied to grid tiles on both axes
const GRID_JITTER: f32 = 0.2;

/// How tiles are arranged in front of the viewer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileLayout {
    /// Golden-angle spiral over a sphere, stretched vertically
    Sphere { radius: f32, height_range: f32 },
    /// Rows of tiles on a plane `depth` metres ahead
    Grid {
        tiles_per_row: usize,
        spacing: f32,
        depth: f32,
    },
}

impl Default for TileLayout {
    fn default() -> Self {
        TileLayout::Sphere {
            radius: 3.0,
            height_range: 2.0,
        }
    }
}

impl TileLayout {
    pub fn positions<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Point3D> {
        match *self {
            TileLayout::Sphere {
                radius,
                height_range,
            } => sphere_layout(count, radius, height_range),
            TileLayout::Grid {
                tiles_per_row,
                spacing,
                depth,
            } => grid_layout(count, tiles_per_row, spacing, depth, rng),
        }
    }
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Evenly spread points on a sphere of `radius`, y scaled by `height_range`
pub fn sphere_layout(count: usize, radius: f32, height_range: f32) -> Vec<Point3D> {
    if count == 1 {
        return vec![Point3D::new(0.0, 0.0, radius)];
    }

    let golden_angle = PI * (3.0 - 5f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 / (count - 1) as f32) * 2.0;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f32;
            Point3D::new(
                theta.cos() * r * radius,
                y * radius * height_range,
                theta.sin() * r * radius,
            )
        })
        .collect()
}

/// Centered grid with a little positional jitter per tile
pub fn grid_layout<R: Rng + ?Sized>(
    count: usize,
    tiles_per_row: usize,
    spacing: f32,
    depth: f32,
    rng: &mut R,
) -> Vec<Point3D> {
    let per_row = tiles_per_row.max(1);
    let rows = count.div_ceil(per_row);
    let start_x = -((per_row - 1) as f32) * spacing * 0.5;
    let start_y = (rows.saturating_sub(1)) as f32 * spacing * 0.5;

    (0..count)
        .map(|i| {
            let row = i / per_row;
            let col = i % per_row;
            let x = start_x + col as f32 * spacing + rng.gen_range(-GRID_JITTER..GRID_JITTER);
            let y = start_y - row as f32 * spacing + rng.gen_range(-GRID_JITTER..GRID_JITTER);
            Point3D::new(x, y, depth)
        })
        .collect()
}

/// `count` points in random directions at a distance in `[min_distance, max_distance]`.
///
/// Non-finite distances yield no stars.
pub fn star_field<R: Rng + ?Sized>(
    count: usize,
    min_distance: f32,
    max_distance: f32,
    rng: &mut R,
) -> Vec<Point3D> {
    if !min_distance.is_finite() || !max_distance.is_finite() {
        warn!(
            "Star field distances must be finite (got {} to {})",
            min_distance, max_distance
        );
        return Vec::new();
    }

    let (near, far) = if min_distance <= max_distance {
        (min_distance, max_distance)
    } else {
        (max_distance, min_distance)
    };

    (0..count)
        .map(|_| {
            // Uniform on the unit sphere: uniform height, uniform azimuth
            let z: f32 = rng.gen_range(-1.0..=1.0);
            let phi: f32 = rng.gen_range(0.0..(2.0 * PI));
            let r = (1.0 - z * z).max(0.0).sqrt();
            let distance = rng.gen_range(near..=far);
            Point3D::new(r * phi.cos() * distance, r * phi.sin() * distance, z * distance)
        })
        .collect()
}

/// Target held in front of the head and pushed one step further every `interval` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceSchedule {
    pub start_distance: f32,
    pub step_distance: f32,
    /// Seconds spent at each distance
    pub interval: f64,
    /// Added to the target height after projecting along the head forward
    pub height_offset: f32,
}

impl Default for DistanceSchedule {
    fn default() -> Self {
        Self {
            start_distance: 1.5,
            step_distance: 0.5,
            interval: 3.0,
            height_offset: 0.0,
        }
    }
}

impl DistanceSchedule {
    /// Completed intervals after `elapsed` seconds.
    ///
    /// Stays at 0 for negative or non-finite elapsed time and for a
    /// non-positive interval.
    pub fn level_at(&self, elapsed: f64) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 || !self.interval.is_finite() || self.interval <= 0.0 {
            return 0;
        }
        // `as` saturates at u32::MAX
        (elapsed / self.interval).floor() as u32
    }

    pub fn distance_at(&self, elapsed: f64) -> f32 {
        self.start_distance + self.step_distance * self.level_at(elapsed) as f32
    }

    /// Where the target sits for this head pose, `None` when the head has no direction
    pub fn position_at(&self, head: &PoseSample, elapsed: f64) -> Option<Point3D> {
        if head.forward.is_degenerate() {
            return None;
        }
        let distance = self.distance_at(elapsed);
        if !distance.is_finite() {
            warn!("Scheduled target distance is not finite at t={}", elapsed);
            return None;
        }
        let ahead = head.position + head.forward.normalize() * distance;
        Some(ahead + Vector3D::new(0.0, self.height_offset, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tile_sits_ahead() {
        assert_eq!(sphere_layout(1, 3.0, 2.0), vec![Point3D::new(0.0, 0.0, 3.0)]);
        assert!(sphere_layout(0, 3.0, 2.0).is_empty());
    }

    #[test]
    fn test_sphere_layout_spans_height() {
        let points = sphere_layout(5, 3.0, 2.0);
        assert_eq!(points.len(), 5);
        assert!((points[0].y - 6.0).abs() < 1e-5);
        assert!((points[4].y + 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_grid_layout_rows() {
        let mut rng = seeded_rng(7);
        let points = grid_layout(5, 3, 1.5, 3.0, &mut rng);
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.z == 3.0));
        // first column of first row is near (-1.5, 0.75)
        assert!((points[0].x + 1.5).abs() <= GRID_JITTER);
        assert!((points[0].y - 0.75).abs() <= GRID_JITTER);
        // second row starts one spacing lower
        assert!((points[3].y + 0.75).abs() <= GRID_JITTER);
    }

    #[test]
    fn test_star_field_distances() {
        let mut rng = seeded_rng(42);
        let stars = star_field(200, 5.0, 20.0, &mut rng);
        assert_eq!(stars.len(), 200);
        for star in &stars {
            let d = star.distance(&Point3D::ORIGIN);
            assert!(d >= 5.0 - 1e-3 && d <= 20.0 + 1e-3);
        }
    }

    #[test]
    fn test_star_field_non_finite_is_empty() {
        let mut rng = seeded_rng(5);
        assert!(star_field(10, f32::NAN, f32::NAN, &mut rng).is_empty());
        assert!(star_field(10, 5.0, f32::INFINITY, &mut rng).is_empty());
    }

    #[test]
    fn test_schedule_steps_each_interval() {
        let schedule = DistanceSchedule::default();
        assert_eq!(schedule.level_at(0.0), 0);
        assert_eq!(schedule.distance_at(2.9), 1.5);
        assert_eq!(schedule.level_at(3.1), 1);
        assert_eq!(schedule.distance_at(3.1), 2.0);
        assert_eq!(schedule.distance_at(7.5), 2.5);
    }

    #[test]
    fn test_schedule_holds_for_bad_time_or_interval() {
        let schedule = DistanceSchedule::default();
        assert_eq!(schedule.level_at(-4.0), 0);
        assert_eq!(schedule.level_at(f64::NAN), 0);
        assert_eq!(schedule.level_at(f64::INFINITY), 0);

        let stuck = DistanceSchedule {
            interval: 0.0,
            ..DistanceSchedule::default()
        };
        assert_eq!(stuck.distance_at(100.0), 1.5);
    }

    #[test]
    fn test_schedule_follows_head() {
        let schedule = DistanceSchedule {
            height_offset: -0.25,
            ..DistanceSchedule::default()
        };
        let head = PoseSample::new(Point3D::new(1.0, 1.6, 0.0), Vector3D::new(0.0, 0.0, 2.0));

        let near = schedule.position_at(&head, 1.0).unwrap();
        assert!(near.distance(&Point3D::new(1.0, 1.35, 1.5)) < 1e-5);
        let far = schedule.position_at(&head, 6.5).unwrap();
        assert!(far.distance(&Point3D::new(1.0, 1.35, 2.5)) < 1e-5);

        let blind = PoseSample::new(Point3D::ORIGIN, Vector3D::ZERO);
        assert!(schedule.position_at(&blind, 1.0).is_none());
    }

    #[test]
    fn test_schedule_reads_partial_json() {
        let schedule: DistanceSchedule = serde_json::from_str(r#"{"interval":4.0}"#).unwrap();
        assert_eq!(schedule.interval, 4.0);
        assert_eq!(schedule.start_distance, 1.5);
    }

    #[test]
    fn test_seeded_layouts_repeat() {
        let a = star_field(10, 5.0, 20.0, &mut seeded_rng(1));
        let b = star_field(10, 5.0, 20.0, &mut seeded_rng(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_layout_deserializes_tagged() {
        let layout: TileLayout =
            serde_json::from_str(r#"{"kind":"grid","tiles_per_row":4,"spacing":1.0,"depth":2.5}"#)
                .unwrap();
        assert_eq!(
            layout,
            TileLayout::Grid {
                tiles_per_row: 4,
                spacing: 1.0,
                depth: 2.5
            }
        );
    }
}
