// Integration tests for the live session: fix source → recorder → ticker → handoff

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use trailpace::checkpoint::{Checkpoint, CheckpointStore, MemoryBackend};
use trailpace::geo::GeoPoint;
use trailpace::recorder::{SessionState, SystemClock, TrackRecorder};
use trailpace::session::{ElapsedTicker, LiveSession, SessionConfig};
use trailpace::source::{ChannelSource, FixEvent, FixSource, ReplaySource};

fn pt(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

fn route(n: usize) -> Vec<GeoPoint> {
    (0..n).map(|i| pt(52.0, 13.0 + i as f64 * 0.001)).collect()
}

fn new_store() -> Arc<CheckpointStore> {
    Arc::new(CheckpointStore::new(Arc::new(MemoryBackend::new()), "current_workout"))
}

fn session_with(store: Arc<CheckpointStore>, source: Box<dyn FixSource>) -> LiveSession {
    let config = SessionConfig {
        session_id: "test-workout".to_string(),
        tick_interval: Duration::from_millis(10),
        ..SessionConfig::default()
    };
    let recorder = TrackRecorder::new(store, Arc::new(SystemClock));
    LiveSession::new(config, recorder, source)
}

/// Location permission denied
struct DeniedSource;

#[async_trait::async_trait]
impl FixSource for DeniedSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<FixEvent>> {
        bail!("location permission denied")
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_active(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "denied"
    }
}

#[tokio::test]
async fn test_replay_records_every_fix() -> Result<()> {
    let points = route(30);
    let source = ReplaySource::new(points.clone(), Duration::ZERO);
    let mut session = session_with(new_store(), Box::new(source));

    session.start().await?;
    session.wait_for_source().await;
    let finished = session.stop().await?;

    assert_eq!(finished.track.points(), points.as_slice());
    assert!(!session.is_recording().await);
    Ok(())
}

#[tokio::test]
async fn test_source_distance_filter_suppresses_close_fixes() -> Result<()> {
    // Second point is ~1 m from the first, third ~70 m further on
    let points = vec![pt(52.0, 13.0), pt(52.0, 13.000015), pt(52.0, 13.001)];
    let source = ReplaySource::new(points, Duration::ZERO).with_min_distance(5.0);
    let mut session = session_with(new_store(), Box::new(source));

    session.start().await?;
    session.wait_for_source().await;
    let finished = session.stop().await?;

    assert_eq!(finished.track.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_source_failure_keeps_session_idle() -> Result<()> {
    let store = new_store();
    let mut session = session_with(Arc::clone(&store), Box::new(DeniedSource));

    let err = session.start().await.unwrap_err();
    assert!(format!("{:#}", err).contains("permission denied"));
    assert!(!session.is_recording().await);
    assert!(store.load().await.is_none(), "no checkpoint for a session that never started");
    Ok(())
}

#[tokio::test]
async fn test_source_errors_are_not_fatal() -> Result<()> {
    let source = ChannelSource::new(16);
    let inlet = source.inlet();
    let mut session = session_with(new_store(), Box::new(source));

    session.start().await?;
    inlet.push(FixEvent::Fix(pt(1.0, 1.0))).await?;
    inlet.push(FixEvent::Error("GPS signal lost".to_string())).await?;
    inlet.push(FixEvent::Fix(pt(1.0, 1.001))).await?;

    // Let the pump drain the channel
    for _ in 0..100 {
        if session.snapshot().await.point_count == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(session.is_recording().await);
    let finished = session.stop().await?;
    assert_eq!(finished.track.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_push_after_stop_is_refused() -> Result<()> {
    let source = ChannelSource::new(16);
    let inlet = source.inlet();
    let mut session = session_with(new_store(), Box::new(source));

    session.start().await?;
    let finished = session.stop().await?;

    assert!(inlet.push(FixEvent::Fix(pt(1.0, 1.0))).await.is_err());
    assert!(finished.track.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_ticker_publishes_while_recording_and_stops_after() -> Result<()> {
    let source = ChannelSource::new(16);
    let mut session = session_with(new_store(), Box::new(source));
    let mut stats = session.subscribe();
    assert_eq!(stats.borrow().state, SessionState::Idle);

    session.start().await?;
    tokio::time::timeout(Duration::from_secs(2), stats.changed()).await??;
    assert_eq!(stats.borrow_and_update().state, SessionState::Recording);

    session.stop().await?;
    assert_eq!(stats.borrow_and_update().state, SessionState::Idle);

    // No tick may follow the stop
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!stats.has_changed()?);
    Ok(())
}

#[tokio::test]
async fn test_dropped_ticker_stops_publishing() -> Result<()> {
    let mut recorder = TrackRecorder::new(new_store(), Arc::new(SystemClock));
    recorder.start().await?;
    let recorder = Arc::new(Mutex::new(recorder));

    let (tx, mut stats) = watch::channel(recorder.lock().await.snapshot());
    let tx = Arc::new(tx);
    let ticker = ElapsedTicker::spawn(
        Arc::clone(&recorder),
        Duration::from_millis(10),
        Arc::clone(&tx),
    );
    assert!(ticker.is_running());

    tokio::time::timeout(Duration::from_secs(2), stats.changed()).await??;
    drop(ticker);

    // Give an in-flight tick a chance to land, then expect silence
    tokio::time::sleep(Duration::from_millis(20)).await;
    stats.borrow_and_update();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!stats.has_changed()?);
    assert!(recorder.lock().await.is_recording(), "recorder itself is untouched");
    Ok(())
}

#[tokio::test]
async fn test_dropping_a_recording_session_ends_its_ticker() -> Result<()> {
    let source = ChannelSource::new(16);
    let mut session = session_with(new_store(), Box::new(source));
    let mut stats = session.subscribe();

    session.start().await?;
    tokio::time::timeout(Duration::from_secs(2), stats.changed()).await??;
    drop(session);

    // The ticker held the last other handle on the stats sender
    let mut closed = false;
    for _ in 0..100 {
        if stats.has_changed().is_err() {
            closed = true;
            break;
        }
        stats.borrow_and_update();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(closed, "stats channel still open after the session was dropped");
    Ok(())
}

#[tokio::test]
async fn test_start_refused_until_checkpoint_resolved() -> Result<()> {
    let store = new_store();
    store
        .save(&Checkpoint::new(route(5), chrono::Utc::now() - chrono::Duration::minutes(10)))
        .await?;

    let source = ChannelSource::new(16);
    let inlet = source.inlet();
    let mut session = session_with(Arc::clone(&store), Box::new(source));

    assert!(session.start().await.is_err());
    assert!(inlet.push(FixEvent::Fix(pt(1.0, 1.0))).await.is_err(), "source must not open");

    let checkpoint = session.pending_checkpoint().await.expect("pending checkpoint");
    session.resume(checkpoint).await?;

    let live = session.snapshot().await;
    assert_eq!(live.state, SessionState::Recording);
    assert_eq!(live.point_count, 5);
    assert!(live.elapsed_seconds >= 600.0, "prior elapsed carried over");

    inlet.push(FixEvent::Fix(pt(52.0, 13.01))).await?;
    for _ in 0..100 {
        if session.snapshot().await.point_count == 6 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let finished = session.stop().await?;
    assert_eq!(finished.track.len(), 6);
    assert!(store.load().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_discard_allows_fresh_start() -> Result<()> {
    let store = new_store();
    store
        .save(&Checkpoint::new(route(3), chrono::Utc::now()))
        .await?;
    let mut session = session_with(Arc::clone(&store), Box::new(ChannelSource::new(4)));

    session.discard_checkpoint().await?;
    session.start().await?;

    let checkpoint = store.load().await.expect("fresh checkpoint");
    assert!(checkpoint.points.is_empty());
    session.stop().await?;
    Ok(())
}
