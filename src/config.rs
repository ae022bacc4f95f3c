use crate::analytics::{SplitConfig, DEFAULT_MIN_PARTIAL_SPLIT_METERS, DEFAULT_SPLIT_LENGTH_METERS};
use crate::checkpoint::{CheckpointStore, FileBackend, DEFAULT_CHECKPOINT_KEY};
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub recorder: RecorderConfig,
    pub source: SourceConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Directory holding the checkpoint file; `~` is expanded
    pub checkpoint_dir: String,
    pub checkpoint_key: String,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Provider-side movement filter
    pub min_distance_meters: f64,
    pub replay_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub split_length_meters: f64,
    pub min_partial_split_meters: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "trailpace".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "~/.trailpace".to_string(),
            checkpoint_key: DEFAULT_CHECKPOINT_KEY.to_string(),
            tick_interval_ms: 1000,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_distance_meters: 0.0,
            replay_interval_ms: 1000,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            split_length_meters: DEFAULT_SPLIT_LENGTH_METERS,
            min_partial_split_meters: DEFAULT_MIN_PARTIAL_SPLIT_METERS,
        }
    }
}

impl Config {
    /// Load from `path` (extension optional). A missing file yields defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("TRAILPACE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn split_config(&self) -> SplitConfig {
        SplitConfig {
            split_length: self.analytics.split_length_meters,
            min_partial_length: self.analytics.min_partial_split_meters,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.recorder.tick_interval_ms)
    }

    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.source.replay_interval_ms)
    }
}

impl RecorderConfig {
    pub fn checkpoint_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.checkpoint_dir).into_owned())
    }

    /// File-backed checkpoint store at the configured location
    pub fn open_store(&self) -> Arc<CheckpointStore> {
        let backend = Arc::new(FileBackend::new(self.checkpoint_dir()));
        Arc::new(CheckpointStore::new(backend, self.checkpoint_key.clone()))
    }
}
