use crate::analytics::SplitConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session identifier used in logs (e.g., "workout-3f2c...")
    pub session_id: String,

    /// How often live stats are published
    /// Default: 1 second
    pub tick_interval: Duration,

    /// How the finished track is cut into splits
    pub split: SplitConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("workout-{}", uuid::Uuid::new_v4()),
            tick_interval: Duration::from_secs(1),
            split: SplitConfig::default(),
        }
    }
}
