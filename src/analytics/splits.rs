use crate::geo::haversine_distance;
use crate::recorder::{seconds_between, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One kilometre
pub const DEFAULT_SPLIT_LENGTH_METERS: f64 = 1000.0;

/// Trailing remainders this short are GPS noise, not a split
pub const DEFAULT_MIN_PARTIAL_SPLIT_METERS: f64 = 50.0;

/// Summed segment lengths this close to a boundary count as reaching it
const BOUNDARY_TOLERANCE_METERS: f64 = 1e-6;

/// How a track is cut into splits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Distance covered by each full split, in meters
    pub split_length: f64,

    /// A trailing partial split must be longer than this to be reported
    pub min_partial_length: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            split_length: DEFAULT_SPLIT_LENGTH_METERS,
            min_partial_length: DEFAULT_MIN_PARTIAL_SPLIT_METERS,
        }
    }
}

/// A fixed-distance slice of a finished track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// 1-based
    pub index: usize,

    /// Cumulative distance at the end of this split, in meters
    pub distance: f64,

    /// Distance covered within this split (the split length unless partial)
    pub split_distance: f64,

    /// Time since the previous split boundary
    pub elapsed_seconds: f64,

    /// Seconds per meter over this split. Kept unrounded.
    pub pace: f64,

    /// Trailing remainder shorter than a full split
    pub partial: bool,
}

/// Time offset in seconds from `start` for every point
///
/// Uses the fixes' own timestamps when all of them have one. Otherwise the
/// session duration is spread evenly by point ordinal, not by distance.
pub fn point_offsets(track: &Track, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<f64> {
    let points = track.points();

    if track.all_timed() {
        return points
            .iter()
            .map(|p| p.timestamp.map_or(0.0, |t| seconds_between(start, t)))
            .collect();
    }

    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let total = seconds_between(start, end).max(0.0);
    (0..n)
        .map(|i| total * i as f64 / (n - 1) as f64)
        .collect()
}

/// Cut a finished track into fixed-distance splits
///
/// Boundary instants are interpolated inside the segment that crosses the
/// boundary, proportional to the distance still needed to reach it. The
/// first split is timed from `start`; a trailing partial ends at `end`.
pub fn compute_splits(
    track: &Track,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    config: &SplitConfig,
) -> Vec<Split> {
    let split_length = config.split_length;
    if !(split_length.is_finite() && split_length > 0.0) {
        warn!("Ignoring split request with length {}", split_length);
        return Vec::new();
    }

    let points = track.points();
    if points.len() < 2 {
        return Vec::new();
    }

    let offsets = point_offsets(track, start, end);
    let mut splits = Vec::new();
    let mut cumulative = 0.0;
    let mut next_boundary = split_length;
    let mut last_boundary_offset = 0.0;

    for i in 1..points.len() {
        let segment = haversine_distance(&points[i - 1], &points[i]);
        // Duplicate fixes contribute nothing and would divide by zero
        if segment <= 0.0 {
            continue;
        }

        let (t0, t1) = (offsets[i - 1], offsets[i]);
        while cumulative + segment + BOUNDARY_TOLERANCE_METERS >= next_boundary {
            let fraction = ((next_boundary - cumulative) / segment).clamp(0.0, 1.0);
            let boundary_offset = t0 + fraction * (t1 - t0);
            let elapsed = boundary_offset - last_boundary_offset;

            splits.push(Split {
                index: splits.len() + 1,
                distance: next_boundary,
                split_distance: split_length,
                elapsed_seconds: elapsed,
                pace: elapsed / split_length,
                partial: false,
            });

            last_boundary_offset = boundary_offset;
            next_boundary += split_length;
        }

        cumulative += segment;
    }

    let remainder = (cumulative - (next_boundary - split_length)).max(0.0);
    if remainder > config.min_partial_length.max(0.0) {
        let elapsed = (seconds_between(start, end) - last_boundary_offset).max(0.0);
        splits.push(Split {
            index: splits.len() + 1,
            distance: cumulative,
            split_distance: remainder,
            elapsed_seconds: elapsed,
            pace: elapsed / remainder,
            partial: true,
        });
    }

    splits
}
