use crate::recorder::{LiveStats, SessionState, TrackRecorder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

const MIN_TICK: Duration = Duration::from_millis(10);

/// Repeating task that publishes live stats while recording
///
/// Ends on `cancel()`, when the recorder leaves `Recording`, or when dropped.
pub struct ElapsedTicker {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTicker {
    pub fn spawn(
        recorder: Arc<Mutex<TrackRecorder>>,
        period: Duration,
        stats: Arc<watch::Sender<LiveStats>>,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period.max(MIN_TICK));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {
                        let snapshot = recorder.lock().await.snapshot();
                        if snapshot.state != SessionState::Recording {
                            break;
                        }
                        stats.send_replace(snapshot);
                    }
                }
            }

            debug!("Elapsed ticker stopped");
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop ticking and wait for the task to exit
    pub async fn cancel(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
