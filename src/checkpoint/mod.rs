//! Crash-safe checkpointing of the in-progress workout
//!
//! A single well-known key holds the most recent unfinished session as
//! `{"points": [...], "startTime": ...}`. The `CheckpointWriter` owns the
//! store while recording so that ingestion never waits on persistence.

pub mod backend;
pub mod store;
pub mod writer;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use store::{Checkpoint, CheckpointStore, DEFAULT_CHECKPOINT_KEY};
pub use writer::CheckpointWriter;
