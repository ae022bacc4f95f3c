// Tests for the track recorder state machine, resume flow and checkpoint coordination

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use trailpace::checkpoint::{Checkpoint, CheckpointStore, KeyValueBackend, MemoryBackend};
use trailpace::geo::{cumulative_distance, GeoPoint};
use trailpace::recorder::{IngestOutcome, ManualClock, SessionState, TrackRecorder};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap()
}

fn pt(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

struct Harness {
    recorder: TrackRecorder,
    store: Arc<CheckpointStore>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    harness_with(Arc::new(MemoryBackend::new()))
}

fn harness_with(backend: Arc<dyn KeyValueBackend>) -> Harness {
    let store = Arc::new(CheckpointStore::new(backend, "current_workout"));
    let clock = Arc::new(ManualClock::new(t0()));
    let recorder = TrackRecorder::new(Arc::clone(&store), clock.clone());
    Harness {
        recorder,
        store,
        clock,
    }
}

/// Reads work, writes always fail
struct ReadOnlyBackend;

#[async_trait::async_trait]
impl KeyValueBackend for ReadOnlyBackend {
    async fn set(&self, _key: &str, _value: String) -> Result<()> {
        bail!("read-only filesystem")
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        bail!("read-only filesystem")
    }

    fn name(&self) -> &str {
        "read-only"
    }
}

#[tokio::test]
async fn test_start_ingest_stop() -> Result<()> {
    let mut h = harness();
    assert_eq!(h.recorder.state(), SessionState::Idle);

    h.recorder.start().await?;
    assert_eq!(h.recorder.state(), SessionState::Recording);

    let points = [pt(0.0, 0.0), pt(0.0, 0.001), pt(0.0, 0.002)];
    for p in points {
        h.clock.advance(Duration::seconds(10));
        assert_eq!(h.recorder.ingest(p), IngestOutcome::Accepted);
    }

    let live = h.recorder.snapshot();
    assert_eq!(live.point_count, 3);
    assert_eq!(live.elapsed_seconds, 30.0);
    assert!((live.distance_meters - cumulative_distance(&points)).abs() < 1e-9);

    h.clock.advance(Duration::seconds(5));
    let finished = h.recorder.stop().await?;

    assert_eq!(h.recorder.state(), SessionState::Idle);
    assert_eq!(finished.track.points(), &points);
    assert_eq!(finished.start_time, t0());
    assert_eq!(finished.end_time, t0() + Duration::seconds(35));
    assert_eq!(h.recorder.snapshot().point_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_start_writes_initial_checkpoint_and_stop_removes_it() -> Result<()> {
    let mut h = harness();
    h.recorder.start().await?;

    let initial = h.store.load().await.expect("initial checkpoint");
    assert_eq!(initial.start_time, t0());
    assert!(initial.points.is_empty());

    h.recorder.ingest(pt(1.0, 1.0));
    h.recorder.ingest(pt(1.0, 1.001));
    h.recorder.flush().await;
    assert_eq!(h.store.load().await.unwrap().points.len(), 2);

    h.recorder.stop().await?;
    assert!(h.store.load().await.is_none(), "stop must delete the checkpoint");
    Ok(())
}

#[tokio::test]
async fn test_fixes_after_stop_are_dropped() -> Result<()> {
    let mut h = harness();
    h.recorder.start().await?;
    h.recorder.ingest(pt(10.0, 10.0));

    let finished = h.recorder.stop().await?;
    assert_eq!(h.recorder.ingest(pt(10.0, 10.001)), IngestOutcome::Dropped);

    assert_eq!(finished.track.len(), 1);
    assert!(h.recorder.track().is_empty());
    assert!(h.store.load().await.is_none(), "late fix must not resurrect a checkpoint");
    Ok(())
}

#[tokio::test]
async fn test_ingest_while_idle_is_a_no_op() {
    let mut h = harness();
    assert_eq!(h.recorder.ingest(pt(1.0, 2.0)), IngestOutcome::Dropped);
    assert!(h.recorder.track().is_empty());
}

#[tokio::test]
async fn test_invalid_fix_is_rejected_and_recording_continues() -> Result<()> {
    let mut h = harness();
    h.recorder.start().await?;

    let bad = GeoPoint {
        latitude: 91.0,
        longitude: 0.0,
        timestamp: None,
    };
    assert_eq!(h.recorder.ingest(bad), IngestOutcome::Rejected);
    assert_eq!(h.recorder.ingest(pt(45.0, 7.0)), IngestOutcome::Accepted);

    assert_eq!(h.recorder.state(), SessionState::Recording);
    assert_eq!(h.recorder.track().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_guarded_transitions() -> Result<()> {
    let mut h = harness();
    assert!(h.recorder.stop().await.is_err(), "stop from idle");

    h.recorder.start().await?;
    assert!(h.recorder.start().await.is_err(), "start while recording");
    assert!(h.recorder.discard_checkpoint().await.is_err(), "discard while recording");
    assert!(
        h.recorder.resume(Checkpoint::new(vec![], t0())).await.is_err(),
        "resume while recording"
    );
    assert_eq!(h.recorder.state(), SessionState::Recording);
    Ok(())
}

#[tokio::test]
async fn test_start_refused_while_checkpoint_pending() -> Result<()> {
    let mut h = harness();
    h.store
        .save(&Checkpoint::new(vec![pt(0.0, 0.0)], t0() - Duration::minutes(5)))
        .await?;

    assert!(h.recorder.start().await.is_err());
    assert_eq!(h.recorder.state(), SessionState::Idle);
    assert!(h.store.load().await.is_some(), "pending checkpoint must survive a refused start");
    Ok(())
}

#[tokio::test]
async fn test_discard_then_start_fresh() -> Result<()> {
    let mut h = harness();
    h.store
        .save(&Checkpoint::new(vec![pt(0.0, 0.0)], t0() - Duration::minutes(5)))
        .await?;

    assert!(h.recorder.pending_checkpoint().await.is_some());
    h.recorder.discard_checkpoint().await?;
    assert!(h.recorder.pending_checkpoint().await.is_none());

    h.recorder.start().await?;
    assert!(h.recorder.track().is_empty());
    assert_eq!(h.store.load().await.unwrap().start_time, t0());
    Ok(())
}

#[tokio::test]
async fn test_resumed_elapsed_time_is_prior_plus_ticks() -> Result<()> {
    let mut h = harness();
    let restored = vec![pt(0.0, 0.0), pt(0.0, 0.001)];
    h.store.save(&Checkpoint::new(restored.clone(), t0())).await?;

    // User resumes 30s after the original start
    h.clock.advance(Duration::seconds(30));
    let checkpoint = h.recorder.pending_checkpoint().await.expect("pending");
    h.recorder.resume(checkpoint).await?;

    assert_eq!(h.recorder.session().prior_elapsed_seconds(), 30.0);
    assert_eq!(h.recorder.elapsed_seconds(), 30.0);

    h.clock.advance(Duration::seconds(10));
    assert_eq!(h.recorder.elapsed_seconds(), 40.0);

    // Restored points form the prefix of the new track
    assert_eq!(h.recorder.ingest(pt(0.0, 0.002)), IngestOutcome::Accepted);
    assert_eq!(&h.recorder.track().points()[..2], restored.as_slice());
    assert!((h.recorder.distance_meters() - cumulative_distance(h.recorder.track().points())).abs() < 1e-9);

    // The stored checkpoint follows the live track point for point
    h.recorder.flush().await;
    let saved = h.store.load().await.expect("checkpoint while recording");
    assert_eq!(saved.start_time, t0());
    assert_eq!(saved.points.as_slice(), h.recorder.track().points());

    let finished = h.recorder.stop().await?;
    assert_eq!(finished.start_time, t0());
    assert_eq!(finished.track.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_persistence_failure_never_stops_recording() -> Result<()> {
    let mut h = harness_with(Arc::new(ReadOnlyBackend));

    h.recorder.start().await?;
    for i in 0..20 {
        assert_eq!(h.recorder.ingest(pt(0.0, i as f64 * 1e-4)), IngestOutcome::Accepted);
    }
    h.recorder.flush().await;
    assert_eq!(h.recorder.state(), SessionState::Recording);

    let finished = h.recorder.stop().await?;
    assert_eq!(finished.track.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_recorder_accepts_irregular_spacing() -> Result<()> {
    let mut h = harness();
    h.recorder.start().await?;

    // Same spot twice, then a long jump, then a tiny step
    for p in [pt(0.0, 0.0), pt(0.0, 0.0), pt(0.0, 0.05), pt(0.0, 0.050001)] {
        assert_eq!(h.recorder.ingest(p), IngestOutcome::Accepted);
    }
    assert_eq!(h.recorder.track().len(), 4);
    Ok(())
}
