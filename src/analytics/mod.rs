//! Post-hoc workout analytics
//!
//! Pure functions of a finished track:
//! - fixed-distance splits with interpolated boundary times and pace
//! - total distance, duration and average speed
//! - display helpers for clock times and kilometres

mod format;
mod report;
mod splits;
mod summary;

pub use format::{format_clock, format_km, speed_kmh};
pub use report::{PaceRange, WorkoutReport};
pub use splits::{
    compute_splits, point_offsets, Split, SplitConfig, DEFAULT_MIN_PARTIAL_SPLIT_METERS,
    DEFAULT_SPLIT_LENGTH_METERS,
};
pub use summary::{average_speed, duration_seconds, WorkoutSummary, MIN_DURATION_SECONDS};
