use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use trailpace::{
    create_router, AppState, ChannelSource, Config, FinishedTrack, LiveSession, ReplaySource,
    SessionConfig, SystemClock, TrackRecorder,
};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "trailpace")]
#[command(about = "Record outdoor workouts and report distance, time and splits")]
struct Args {
    /// Config file (extension optional; missing file means defaults)
    #[arg(short, long, default_value = "config/trailpace")]
    config: String,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the report for a finished track (JSON)
    Analyze { path: PathBuf },

    /// Record a session from a JSON array of points
    Replay {
        path: PathBuf,

        /// Milliseconds between replayed fixes (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Continue an unfinished workout instead of refusing to start
        #[arg(long)]
        resume: bool,
    },

    /// Inspect or drop the unfinished-workout checkpoint
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },

    /// Run the HTTP control API
    Serve,
}

#[derive(Subcommand)]
enum CheckpointAction {
    Show,
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let cfg = Config::load(&args.config)?;
    info!("Loaded config: {}", cfg.service.name);

    match args.command {
        Command::Analyze { path } => {
            let finished = FinishedTrack::load(&path)?;
            println!("{}", finished.report(&cfg.split_config()));
        }
        Command::Replay {
            path,
            interval_ms,
            resume,
        } => replay(&cfg, path, interval_ms, resume).await?,
        Command::Checkpoint { action } => {
            let store = cfg.recorder.open_store();
            match action {
                CheckpointAction::Show => match store.load().await {
                    Some(checkpoint) => println!("{}", serde_json::to_string_pretty(&checkpoint)?),
                    None => println!("No unfinished workout"),
                },
                CheckpointAction::Clear => {
                    store.clear().await?;
                    println!("Checkpoint cleared");
                }
            }
        }
        Command::Serve => serve(&cfg).await?,
    }

    Ok(())
}

fn session_config(cfg: &Config) -> SessionConfig {
    SessionConfig {
        tick_interval: cfg.tick_interval(),
        split: cfg.split_config(),
        ..SessionConfig::default()
    }
}

async fn replay(cfg: &Config, path: PathBuf, interval_ms: Option<u64>, resume: bool) -> Result<()> {
    let interval = interval_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| cfg.replay_interval());
    let source = ReplaySource::from_file(&path, interval)?
        .with_min_distance(cfg.source.min_distance_meters);

    let recorder = TrackRecorder::new(cfg.recorder.open_store(), Arc::new(SystemClock));
    let mut session = LiveSession::new(session_config(cfg), recorder, Box::new(source));

    match session.pending_checkpoint().await {
        Some(checkpoint) if resume => session.resume(checkpoint).await?,
        Some(_) => bail!("An unfinished workout exists; rerun with --resume or clear the checkpoint"),
        None => session.start().await?,
    }

    session.wait_for_source().await;
    let finished = session.stop().await?;
    println!("{}", finished.report(&session.config().split));
    Ok(())
}

async fn serve(cfg: &Config) -> Result<()> {
    let source = ChannelSource::new(256);
    let inlet = source.inlet();
    let recorder = TrackRecorder::new(cfg.recorder.open_store(), Arc::new(SystemClock));
    let session = LiveSession::new(session_config(cfg), recorder, Box::new(source));

    if session.pending_checkpoint().await.is_some() {
        warn!("Unfinished workout found; resume or discard it via /checkpoint");
    }

    let app = create_router(AppState::new(session, inlet));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
