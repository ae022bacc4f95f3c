use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single geographic fix
///
/// A point without a timestamp is still a valid fix; the split engine falls
/// back to ordinal time interpolation when any point in a track lacks one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees, [-90, 90]
    pub latitude: f64,

    /// Degrees, [-180, 180]
    pub longitude: f64,

    /// When the fix was taken, if the source reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl GeoPoint {
    /// Create an untimed point, rejecting out-of-range coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self {
            latitude,
            longitude,
            timestamp: None,
        };
        ensure!(
            point.is_valid(),
            "Invalid coordinates: latitude={}, longitude={}",
            latitude,
            longitude
        );
        Ok(point)
    }

    /// Create a point carrying its own fix time
    pub fn timed(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Result<Self> {
        let mut point = Self::new(latitude, longitude)?;
        point.timestamp = Some(timestamp);
        Ok(point)
    }

    /// Range check. Points can be built as literals or deserialized, so the
    /// recorder re-checks at ingestion.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn is_timed(&self) -> bool {
        self.timestamp.is_some()
    }
}
