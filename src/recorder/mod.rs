//! Track recording state machine
//!
//! This module provides the `TrackRecorder`, the single owner of the live
//! session:
//! - Idle → Recording on `start()` or on resuming a checkpoint
//! - Recording → Idle on `stop()`, handing off an immutable `FinishedTrack`
//! - Fix ingestion gated on state (late fixes are dropped, never raised)
//! - Fire-and-forget checkpointing through the `CheckpointWriter`

mod clock;
mod recorder;
mod state;
mod track;

pub use clock::{seconds_between, Clock, ManualClock, SystemClock};
pub use recorder::{IngestOutcome, TrackRecorder};
pub use state::{LiveStats, Session, SessionState};
pub use track::{FinishedTrack, Track};
