use crate::geo::GeoPoint;
use anyhow::Result;
use tokio::sync::mpsc;

/// Something delivered by a fix source
#[derive(Debug, Clone, PartialEq)]
pub enum FixEvent {
    /// A position sample
    Fix(GeoPoint),
    /// A delivery problem. Logged, never fatal to the session.
    Error(String),
}

/// Location provider trait
///
/// Implementations:
/// - `ReplaySource`: replays a recorded point list (CLI, tests)
/// - `ChannelSource`: fixes pushed in from outside (HTTP clients)
///
/// A failing `start()` stands for denied permission or an unavailable
/// provider; the session stays idle.
#[async_trait::async_trait]
pub trait FixSource: Send + Sync {
    /// Start delivering fixes
    ///
    /// Returns a channel receiver that will receive fix events. The channel
    /// closes when the source has nothing more to deliver.
    async fn start(&mut self) -> Result<mpsc::Receiver<FixEvent>>;

    /// Stop delivering fixes
    async fn stop(&mut self) -> Result<()>;

    /// Check if the source is currently delivering
    fn is_active(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}
