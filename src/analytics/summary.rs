use crate::recorder::{seconds_between, FinishedTrack, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durations are floored here so speeds never divide by zero
pub const MIN_DURATION_SECONDS: f64 = 1.0;

/// Headline numbers of a finished workout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub total_distance_meters: f64,
    pub duration_seconds: f64,
    /// Meters per second
    pub average_speed: f64,
}

impl WorkoutSummary {
    pub fn new(track: &Track, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let total_distance_meters = track.cumulative_distance();
        let duration_seconds = duration_seconds(start, end);
        Self {
            total_distance_meters,
            duration_seconds,
            average_speed: average_speed(total_distance_meters, duration_seconds),
        }
    }

    pub fn from_finished(finished: &FinishedTrack) -> Self {
        Self::new(&finished.track, finished.start_time, finished.end_time)
    }

    pub fn distance_km(&self) -> f64 {
        self.total_distance_meters / 1000.0
    }

    /// Distance units per hour
    pub fn average_speed_per_hour(&self) -> f64 {
        self.average_speed * 3600.0
    }

    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_per_hour() / 1000.0
    }
}

/// `end - start` in seconds, never below one second
pub fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    seconds_between(start, end).max(MIN_DURATION_SECONDS)
}

pub fn average_speed(distance: f64, duration_seconds: f64) -> f64 {
    distance / duration_seconds.max(MIN_DURATION_SECONDS)
}
