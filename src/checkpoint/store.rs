use super::backend::KeyValueBackend;
use crate::geo::GeoPoint;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key used when none is configured
pub const DEFAULT_CHECKPOINT_KEY: &str = "current_workout";

/// Durable snapshot of an unfinished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub points: Vec<GeoPoint>,
    pub start_time: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(points: Vec<GeoPoint>, start_time: DateTime<Utc>) -> Self {
        Self { points, start_time }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize checkpoint")
    }

    /// Parse a stored blob. Out-of-range coordinates count as corruption.
    pub fn from_json(json: &str) -> Result<Self> {
        let checkpoint: Checkpoint =
            serde_json::from_str(json).context("Failed to parse checkpoint")?;
        anyhow::ensure!(
            checkpoint.points.iter().all(GeoPoint::is_valid),
            "Checkpoint contains invalid coordinates"
        );
        Ok(checkpoint)
    }
}

/// Single-slot checkpoint persistence over a key-value backend
pub struct CheckpointStore {
    backend: Arc<dyn KeyValueBackend>,
    key: String,
}

impl CheckpointStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Upsert the checkpoint slot
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = checkpoint.to_json()?;
        self.backend
            .set(&self.key, json)
            .await
            .with_context(|| format!("Failed to save checkpoint to {} backend", self.backend.name()))?;

        debug!("Checkpoint saved ({} points)", checkpoint.points.len());
        Ok(())
    }

    /// Read the checkpoint slot
    ///
    /// Absent, unreadable and corrupt checkpoints all yield `None`. A corrupt
    /// one is cleared so it is not offered again.
    pub async fn load(&self) -> Option<Checkpoint> {
        let json = match self.backend.get(&self.key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read checkpoint: {:#}", e);
                return None;
            }
        };

        match Checkpoint::from_json(&json) {
            Ok(checkpoint) => Some(checkpoint),
            Err(e) => {
                warn!("Discarding corrupt checkpoint: {:#}", e);
                if let Err(e) = self.clear().await {
                    warn!("Failed to clear corrupt checkpoint: {:#}", e);
                }
                None
            }
        }
    }

    /// Remove the checkpoint slot; clearing an empty slot is fine
    pub async fn clear(&self) -> Result<()> {
        self.backend
            .delete(&self.key)
            .await
            .with_context(|| format!("Failed to clear checkpoint in {} backend", self.backend.name()))?;

        info!("Checkpoint cleared");
        Ok(())
    }
}
