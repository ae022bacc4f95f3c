//! HTTP API for remote control of the workout session
//!
//! This module provides a REST API around a single live session:
//! - POST /workout/start - Start a new recording
//! - POST /workout/stop - Stop and return the workout report
//! - POST /workout/fix - Push a fix from the device
//! - GET /workout/live - Live elapsed time and distance
//! - GET /checkpoint - Pending unfinished workout, if any
//! - POST /checkpoint/resume - Resume the pending workout
//! - POST /checkpoint/discard - Drop the pending workout
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
