pub mod analytics;
pub mod checkpoint;
pub mod config;
pub mod geo;
pub mod http;
pub mod recorder;
pub mod session;
pub mod source;

pub use analytics::{PaceRange, Split, SplitConfig, WorkoutReport, WorkoutSummary};
pub use checkpoint::{
    Checkpoint, CheckpointStore, CheckpointWriter, FileBackend, KeyValueBackend, MemoryBackend,
};
pub use config::Config;
pub use geo::{cumulative_distance, haversine_distance, GeoPoint};
pub use http::{create_router, AppState};
pub use recorder::{
    Clock, FinishedTrack, IngestOutcome, LiveStats, ManualClock, SessionState, SystemClock,
    Track, TrackRecorder,
};
pub use session::{LiveSession, SessionConfig};
pub use source::{ChannelSource, FixEvent, FixInlet, FixSource, ReplaySource};
