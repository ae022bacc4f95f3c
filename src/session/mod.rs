//! Live workout session
//!
//! This module provides the `LiveSession` abstraction that ties together:
//! - A fix source (location provider)
//! - The track recorder and its checkpointing
//! - The periodic elapsed-time tick for live display
//! - Start / resume / stop orchestration

mod config;
mod session;
mod ticker;

pub use config::SessionConfig;
pub use session::LiveSession;
pub use ticker::ElapsedTicker;
