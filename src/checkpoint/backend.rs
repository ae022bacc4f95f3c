use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Durable key-value medium behind the checkpoint store
///
/// Implementations:
/// - `FileBackend`: one file per key in a directory
/// - `MemoryBackend`: process-local map (tests, ephemeral runs)
#[async_trait::async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Insert or overwrite the blob stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Fetch the blob stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Stores each key as `<dir>/<key>.json`
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait::async_trait]
impl KeyValueBackend for FileBackend {
    async fn set(&self, key: &str, value: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create checkpoint directory: {:?}", self.dir))?;

        // Write then rename so a crash mid-write never leaves a torn file
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        tokio::fs::write(&tmp, value)
            .await
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move checkpoint into place: {:?}", path))?;

        debug!("Wrote {:?}", path);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {:?}", path)),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// In-memory backend; contents die with the process
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
