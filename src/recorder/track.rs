use crate::analytics::{compute_splits, PaceRange, Split, SplitConfig, WorkoutReport, WorkoutSummary};
use crate::geo::{cumulative_distance, GeoPoint};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered, append-only sequence of fixes
///
/// Insertion order is temporal order. Points are never reordered or
/// deduplicated, and spacing between them is arbitrary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    points: Vec<GeoPoint>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total path length in meters
    pub fn cumulative_distance(&self) -> f64 {
        cumulative_distance(&self.points)
    }

    /// True when every point carries its own timestamp (and there is at least one)
    pub fn all_timed(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(GeoPoint::is_timed)
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}

impl From<Vec<GeoPoint>> for Track {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }
}

/// Immutable result of a stopped session, handed off to analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedTrack {
    pub track: Track,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl FinishedTrack {
    pub fn new(track: Track, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            track,
            start_time,
            end_time,
        }
    }

    /// Load a finished track saved as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read finished track: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse finished track: {}", path.display()))
    }

    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary::from_finished(self)
    }

    pub fn splits(&self, config: &SplitConfig) -> Vec<Split> {
        compute_splits(&self.track, self.start_time, self.end_time, config)
    }

    pub fn report(&self, config: &SplitConfig) -> WorkoutReport {
        let splits = self.splits(config);
        WorkoutReport {
            summary: self.summary(),
            pace_range: PaceRange::from_splits(&splits),
            splits,
        }
    }
}
