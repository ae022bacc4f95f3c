use super::config::SessionConfig;
use super::ticker::ElapsedTicker;
use crate::checkpoint::Checkpoint;
use crate::recorder::{FinishedTrack, IngestOutcome, LiveStats, TrackRecorder};
use crate::source::{FixEvent, FixSource};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A live workout: fix source feeding the recorder, plus the display tick
pub struct LiveSession {
    /// Session configuration
    config: SessionConfig,

    /// The single owner of the track; fixes and user actions serialize here
    recorder: Arc<Mutex<TrackRecorder>>,

    /// Location provider
    source: Box<dyn FixSource>,

    /// Task moving fixes from the source into the recorder
    pump_task: Option<JoinHandle<()>>,

    /// Live stats publisher, present only while recording
    ticker: Option<ElapsedTicker>,

    stats: Arc<watch::Sender<LiveStats>>,
}

impl LiveSession {
    pub fn new(config: SessionConfig, recorder: TrackRecorder, source: Box<dyn FixSource>) -> Self {
        info!(
            "Creating live session {} (source: {})",
            config.session_id,
            source.name()
        );
        let (stats, _) = watch::channel(recorder.snapshot());

        Self {
            config,
            recorder: Arc::new(Mutex::new(recorder)),
            source,
            pump_task: None,
            ticker: None,
            stats: Arc::new(stats),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Live stats, refreshed on every tick while recording
    pub fn subscribe(&self) -> watch::Receiver<LiveStats> {
        self.stats.subscribe()
    }

    /// Fresh stats read straight from the recorder
    pub async fn snapshot(&self) -> LiveStats {
        self.recorder.lock().await.snapshot()
    }

    pub async fn is_recording(&self) -> bool {
        self.recorder.lock().await.is_recording()
    }

    pub async fn pending_checkpoint(&self) -> Option<Checkpoint> {
        self.recorder.lock().await.pending_checkpoint().await
    }

    pub async fn discard_checkpoint(&self) -> Result<()> {
        self.recorder.lock().await.discard_checkpoint().await
    }

    /// Start a brand-new recording
    pub async fn start(&mut self) -> Result<()> {
        {
            let recorder = self.recorder.lock().await;
            if recorder.is_recording() {
                bail!("Session {} is already recording", self.config.session_id);
            }
            if recorder.pending_checkpoint().await.is_some() {
                bail!("An unfinished workout checkpoint exists; resume or discard it before starting");
            }
        }

        info!("Starting session: {}", self.config.session_id);
        let rx = self.open_source().await?;

        let started = self.recorder.lock().await.start().await;
        if let Err(e) = started {
            self.close_source().await;
            return Err(e);
        }

        self.begin(rx);
        Ok(())
    }

    /// Continue a checkpointed recording
    pub async fn resume(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if self.recorder.lock().await.is_recording() {
            bail!("Session {} is already recording", self.config.session_id);
        }

        info!(
            "Resuming session {} from checkpoint started {}",
            self.config.session_id, checkpoint.start_time
        );
        let rx = self.open_source().await?;

        let resumed = self.recorder.lock().await.resume(checkpoint).await;
        if let Err(e) = resumed {
            self.close_source().await;
            return Err(e);
        }

        self.begin(rx);
        Ok(())
    }

    /// Wait until the source has delivered everything and the pump has
    /// ingested it. Only returns for sources that end on their own.
    pub async fn wait_for_source(&mut self) {
        if let Some(task) = self.pump_task.take() {
            if let Err(e) = task.await {
                error!("Fix pump panicked: {}", e);
            }
        }
    }

    /// Stop recording and return the finished track
    ///
    /// The recorder flips first, so fixes still in flight are dropped.
    pub async fn stop(&mut self) -> Result<FinishedTrack> {
        let finished = self.recorder.lock().await.stop().await?;

        info!("Stopping session: {}", self.config.session_id);
        self.close_source().await;

        if let Some(task) = self.pump_task.take() {
            task.abort();
            let _ = task.await;
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel().await;
        }

        let idle = self.recorder.lock().await.snapshot();
        self.stats.send_replace(idle);

        info!(
            "Session {} stopped: {} points",
            self.config.session_id,
            finished.track.len()
        );
        Ok(finished)
    }

    async fn open_source(&mut self) -> Result<mpsc::Receiver<FixEvent>> {
        self.source
            .start()
            .await
            .with_context(|| format!("Failed to start {} fix source", self.source.name()))
    }

    async fn close_source(&mut self) {
        if let Err(e) = self.source.stop().await {
            error!("Failed to stop {} fix source: {}", self.source.name(), e);
        }
    }

    fn begin(&mut self, mut rx: mpsc::Receiver<FixEvent>) {
        let recorder = Arc::clone(&self.recorder);
        let session_id = self.config.session_id.clone();

        self.pump_task = Some(tokio::spawn(async move {
            info!("Fix pump started for {}", session_id);
            let mut accepted = 0usize;

            while let Some(event) = rx.recv().await {
                match event {
                    FixEvent::Fix(point) => {
                        if recorder.lock().await.ingest(point) == IngestOutcome::Accepted {
                            accepted += 1;
                        }
                    }
                    FixEvent::Error(message) => {
                        warn!("Fix source error (ignored): {}", message);
                    }
                }
            }

            info!("Fix pump for {} ended after {} fixes", session_id, accepted);
        }));

        self.ticker = Some(ElapsedTicker::spawn(
            Arc::clone(&self.recorder),
            self.config.tick_interval,
            Arc::clone(&self.stats),
        ));
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if let Some(task) = self.pump_task.take() {
            task.abort();
        }
    }
}
