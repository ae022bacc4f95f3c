use super::backend::{FixEvent, FixSource};
use crate::geo::{haversine_distance, GeoPoint};
use anyhow::{ensure, Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Replays a fixed list of points, one per `interval`
///
/// Applies the provider-side movement filter: a point closer than
/// `min_distance_meters` to the last delivered one is suppressed.
pub struct ReplaySource {
    points: Vec<GeoPoint>,
    interval: Duration,
    min_distance_meters: f64,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(points: Vec<GeoPoint>, interval: Duration) -> Self {
        Self {
            points,
            interval,
            min_distance_meters: 0.0,
            task: None,
        }
    }

    pub fn with_min_distance(mut self, meters: f64) -> Self {
        self.min_distance_meters = meters.max(0.0);
        self
    }

    /// Load a JSON array of points
    pub fn from_file(path: impl AsRef<std::path::Path>, interval: Duration) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file: {}", path.display()))?;
        let points: Vec<GeoPoint> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse replay file: {}", path.display()))?;
        info!("Loaded {} points from {}", points.len(), path.display());
        Ok(Self::new(points, interval))
    }
}

#[async_trait::async_trait]
impl FixSource for ReplaySource {
    async fn start(&mut self) -> Result<mpsc::Receiver<FixEvent>> {
        ensure!(self.task.is_none(), "Replay source already started");

        let (tx, rx) = mpsc::channel(100);
        let points = self.points.clone();
        let interval = self.interval;
        let min_distance = self.min_distance_meters;

        self.task = Some(tokio::spawn(async move {
            let mut last_sent: Option<GeoPoint> = None;
            let mut suppressed = 0usize;

            for point in points {
                if let Some(prev) = &last_sent {
                    if haversine_distance(prev, &point) < min_distance {
                        suppressed += 1;
                        continue;
                    }
                }

                if tx.send(FixEvent::Fix(point)).await.is_err() {
                    break;
                }
                last_sent = Some(point);

                if !interval.is_zero() {
                    tokio::time::sleep(interval).await;
                }
            }

            debug!("Replay finished ({} points suppressed by distance filter)", suppressed);
        }));

        info!("Replay source started: {} points", self.points.len());
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Replay source stopped");
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.task.is_some()
    }

    fn name(&self) -> &str {
        "replay"
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
