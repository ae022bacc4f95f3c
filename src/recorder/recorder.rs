use super::clock::Clock;
use super::state::{LiveStats, Session, SessionState};
use super::track::{FinishedTrack, Track};
use crate::checkpoint::{Checkpoint, CheckpointStore, CheckpointWriter};
use crate::geo::{haversine_distance, GeoPoint};
use anyhow::{bail, ensure, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to a fix handed to `ingest`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Appended to the track
    Accepted,
    /// Arrived while not recording (e.g. after `stop()`)
    Dropped,
    /// Coordinates out of range
    Rejected,
}

/// Owns the live session and its checkpointing
pub struct TrackRecorder {
    session: Session,

    /// Running path length, updated per accepted fix
    distance_meters: f64,

    /// Direct store access for reads while idle
    store: Arc<CheckpointStore>,

    /// All writes go through here so they stay ordered
    writer: CheckpointWriter,

    clock: Arc<dyn Clock>,
}

impl TrackRecorder {
    /// Create an idle recorder. Must be called inside a Tokio runtime.
    pub fn new(store: Arc<CheckpointStore>, clock: Arc<dyn Clock>) -> Self {
        let writer = CheckpointWriter::spawn(Arc::clone(&store));
        Self {
            session: Session::idle(),
            distance_meters: 0.0,
            store,
            writer,
            clock,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_recording(&self) -> bool {
        self.session.state() == SessionState::Recording
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn track(&self) -> &Track {
        self.session.track()
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.session.elapsed_seconds(self.clock.now())
    }

    pub fn snapshot(&self) -> LiveStats {
        LiveStats {
            state: self.session.state(),
            elapsed_seconds: self.elapsed_seconds(),
            distance_meters: self.distance_meters,
            point_count: self.session.track().len(),
        }
    }

    /// The unfinished session left behind by a previous run, if any
    pub async fn pending_checkpoint(&self) -> Option<Checkpoint> {
        self.store.load().await
    }

    /// Begin a brand-new session
    ///
    /// Refused while a checkpoint is outstanding: the caller must `resume` or
    /// `discard_checkpoint` first.
    pub async fn start(&mut self) -> Result<()> {
        ensure!(
            self.session.state() == SessionState::Idle,
            "Cannot start: session is {:?}",
            self.session.state()
        );
        if self.store.load().await.is_some() {
            bail!("An unfinished workout checkpoint exists; resume or discard it before starting");
        }

        let now = self.clock.now();
        self.session = Session::fresh(now);
        self.distance_meters = 0.0;
        self.checkpoint_now().await;

        info!("Recording started at {}", now);
        Ok(())
    }

    /// Continue a checkpointed session; its track becomes the prefix of this one
    pub async fn resume(&mut self, checkpoint: Checkpoint) -> Result<()> {
        ensure!(
            self.session.state() == SessionState::Idle,
            "Cannot resume: session is {:?}",
            self.session.state()
        );

        let now = self.clock.now();
        self.session = Session::restored(checkpoint, now);
        self.distance_meters = self.session.track().cumulative_distance();
        self.checkpoint_now().await;

        info!(
            "Recording resumed: {} points restored, {:.1}s already elapsed",
            self.session.track().len(),
            self.session.prior_elapsed_seconds()
        );
        Ok(())
    }

    /// Decline the pending checkpoint and settle into a clean idle state
    pub async fn discard_checkpoint(&mut self) -> Result<()> {
        ensure!(
            self.session.state() == SessionState::Idle,
            "Cannot discard checkpoint while {:?}",
            self.session.state()
        );

        self.writer.clear().await;
        self.session = Session::idle();
        self.distance_meters = 0.0;
        info!("Pending checkpoint discarded");
        Ok(())
    }

    /// Append a fix to the live track
    ///
    /// Never fails and never waits on persistence.
    pub fn ingest(&mut self, point: GeoPoint) -> IngestOutcome {
        if self.session.state() != SessionState::Recording {
            debug!("Dropping fix received while {:?}", self.session.state());
            return IngestOutcome::Dropped;
        }
        if !point.is_valid() {
            warn!(
                "Rejecting fix with invalid coordinates: ({}, {})",
                point.latitude, point.longitude
            );
            return IngestOutcome::Rejected;
        }

        if let Some(last) = self.session.track().last() {
            self.distance_meters += haversine_distance(last, &point);
        }
        self.session.track.push(point);
        self.writer.append(point);

        IngestOutcome::Accepted
    }

    /// End the session and hand off the finished track
    pub async fn stop(&mut self) -> Result<FinishedTrack> {
        ensure!(
            self.session.state() == SessionState::Recording,
            "Cannot stop: session is {:?}",
            self.session.state()
        );

        let end_time = self.clock.now();
        let session = std::mem::take(&mut self.session);
        self.distance_meters = 0.0;
        let finished = session.finish(end_time);

        self.writer.clear().await;

        info!(
            "Recording stopped: {} points, {} -> {}",
            finished.track.len(),
            finished.start_time,
            finished.end_time
        );
        Ok(finished)
    }

    /// Wait for queued checkpoint writes
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    async fn checkpoint_now(&self) {
        if let Some(checkpoint) = self.session.checkpoint() {
            self.writer.submit(checkpoint);
            self.writer.flush().await;
        }
    }
}
