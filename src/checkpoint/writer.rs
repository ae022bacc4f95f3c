use super::store::{Checkpoint, CheckpointStore};
use crate::geo::GeoPoint;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

enum WriterCommand {
    Save(Checkpoint),
    Append(GeoPoint),
    Flush(oneshot::Sender<()>),
    Clear(oneshot::Sender<()>),
}

/// Background checkpoint writer
///
/// Commands run in submission order on one task. The task keeps its own copy
/// of the checkpoint: `submit` replaces it, `append` adds one point to it.
/// Changes queued back to back collapse into a single write, so a burst of
/// fixes costs one write. Persistence failures are logged and swallowed.
pub struct CheckpointWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
    handle: JoinHandle<()>,
}

impl CheckpointWriter {
    /// Spawn the writer task on the current runtime
    pub fn spawn(store: Arc<CheckpointStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Self::run(store, rx));
        Self { tx, handle }
    }

    /// Queue a snapshot. Never blocks; the write happens later.
    pub fn submit(&self, checkpoint: Checkpoint) {
        if self.tx.send(WriterCommand::Save(checkpoint)).is_err() {
            warn!("Checkpoint writer is gone, snapshot dropped");
        }
    }

    /// Queue one more point for the current snapshot. Never blocks.
    pub fn append(&self, point: GeoPoint) {
        if self.tx.send(WriterCommand::Append(point)).is_err() {
            warn!("Checkpoint writer is gone, point dropped");
        }
    }

    /// Wait until everything queued so far has been written
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(ack_tx)).is_err() || ack_rx.await.is_err() {
            warn!("Checkpoint writer is gone, flush skipped");
        }
    }

    /// Discard queued snapshots and delete the stored checkpoint
    ///
    /// Returns once the delete has run, so no earlier save can land after it.
    pub async fn clear(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriterCommand::Clear(ack_tx)).is_err() || ack_rx.await.is_err() {
            warn!("Checkpoint writer is gone, clear skipped");
        }
    }

    /// Close the queue and wait for outstanding writes
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!("Checkpoint writer task panicked: {}", e);
        }
    }

    async fn run(store: Arc<CheckpointStore>, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
        debug!("Checkpoint writer started");
        let mut current: Option<Checkpoint> = None;
        let mut dirty = false;

        while let Some(first) = rx.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = rx.try_recv() {
                batch.push(next);
            }

            for command in batch {
                match command {
                    WriterCommand::Save(checkpoint) => {
                        current = Some(checkpoint);
                        dirty = true;
                    }
                    WriterCommand::Append(point) => match current.as_mut() {
                        Some(checkpoint) => {
                            checkpoint.points.push(point);
                            dirty = true;
                        }
                        None => warn!("No checkpoint to append to, point dropped"),
                    },
                    WriterCommand::Flush(ack) => {
                        Self::persist(&store, current.as_ref(), &mut dirty).await;
                        let _ = ack.send(());
                    }
                    WriterCommand::Clear(ack) => {
                        current = None;
                        dirty = false;
                        if let Err(e) = store.clear().await {
                            warn!("Checkpoint clear failed: {:#}", e);
                        }
                        let _ = ack.send(());
                    }
                }
            }

            Self::persist(&store, current.as_ref(), &mut dirty).await;
        }

        info!("Checkpoint writer stopped");
    }

    async fn persist(store: &CheckpointStore, checkpoint: Option<&Checkpoint>, dirty: &mut bool) {
        if !*dirty {
            return;
        }
        *dirty = false;
        if let Some(checkpoint) = checkpoint {
            if let Err(e) = store.save(checkpoint).await {
                warn!("Checkpoint save failed, recording continues: {:#}", e);
            }
        }
    }
}
