use super::backend::{FixEvent, FixSource};
use anyhow::{anyhow, bail, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::info;

type Slot = Arc<Mutex<Option<mpsc::Sender<FixEvent>>>>;

/// Handle for pushing fixes into a `ChannelSource`
#[derive(Clone)]
pub struct FixInlet {
    slot: Slot,
}

impl FixInlet {
    /// Forward an event to the running session
    ///
    /// Fails when the source is not active.
    pub async fn push(&self, event: FixEvent) -> Result<()> {
        let tx = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        match tx {
            Some(tx) => tx
                .send(event)
                .await
                .map_err(|_| anyhow!("Fix source closed")),
            None => bail!("Fix source is not active"),
        }
    }
}

/// Source fed by `FixInlet` handles
pub struct ChannelSource {
    slot: Slot,
    buffer: usize,
}

impl ChannelSource {
    pub fn new(buffer: usize) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            buffer: buffer.max(1),
        }
    }

    pub fn inlet(&self) -> FixInlet {
        FixInlet {
            slot: Arc::clone(&self.slot),
        }
    }

    fn set(&self, tx: Option<mpsc::Sender<FixEvent>>) {
        *self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = tx;
    }
}

#[async_trait::async_trait]
impl FixSource for ChannelSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<FixEvent>> {
        let (tx, rx) = mpsc::channel(self.buffer);
        self.set(Some(tx));
        info!("Channel source open");
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.set(None);
        info!("Channel source closed");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    fn name(&self) -> &str {
        "channel"
    }
}
