use super::format::{format_clock, format_km};
use super::splits::Split;
use super::summary::WorkoutSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fastest and slowest split pace in seconds per meter, unrounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceRange {
    pub fastest: f64,
    pub fastest_index: usize,
    pub slowest: f64,
    pub slowest_index: usize,
}

impl PaceRange {
    pub fn from_splits(splits: &[Split]) -> Option<Self> {
        let first = splits.first()?;
        let mut range = Self {
            fastest: first.pace,
            fastest_index: first.index,
            slowest: first.pace,
            slowest_index: first.index,
        };

        for split in &splits[1..] {
            if split.pace < range.fastest {
                range.fastest = split.pace;
                range.fastest_index = split.index;
            }
            if split.pace > range.slowest {
                range.slowest = split.pace;
                range.slowest_index = split.index;
            }
        }

        Some(range)
    }
}

/// Everything shown after a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutReport {
    pub summary: WorkoutSummary,
    pub splits: Vec<Split>,
    pub pace_range: Option<PaceRange>,
}

impl fmt::Display for WorkoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIME   {}", format_clock(self.summary.duration_seconds))?;
        writeln!(f, "KM     {}", format_km(self.summary.total_distance_meters))?;
        writeln!(f, "KM/HR  {:.0}", self.summary.average_speed_kmh())?;

        if self.splits.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "SPLITS")?;
        for split in &self.splits {
            let marker = match self.pace_range {
                Some(range) if range.fastest_index == split.index => " *",
                _ => "",
            };
            writeln!(
                f,
                "{:>3}{}  {:>7}  {}{}",
                split.index,
                if split.partial { "~" } else { " " },
                format_km(split.distance),
                format_clock(split.pace * 1000.0),
                marker
            )?;
        }
        Ok(())
    }
}
