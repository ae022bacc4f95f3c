use super::clock::seconds_between;
use super::track::{FinishedTrack, Track};
use crate::checkpoint::Checkpoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Recording,
    Finished,
}

/// The live session owned by the recorder
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) state: SessionState,
    pub(crate) track: Track,
    pub(crate) start_time: Option<DateTime<Utc>>,
    /// Set only when the session was restored from a checkpoint
    pub(crate) resume_time: Option<DateTime<Utc>>,
    /// Elapsed time frozen at the moment of resuming
    pub(crate) prior_elapsed_seconds: f64,
}

impl Session {
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            track: Track::new(),
            start_time: None,
            resume_time: None,
            prior_elapsed_seconds: 0.0,
        }
    }

    pub(crate) fn fresh(start_time: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::Recording,
            track: Track::new(),
            start_time: Some(start_time),
            resume_time: None,
            prior_elapsed_seconds: 0.0,
        }
    }

    pub(crate) fn restored(checkpoint: Checkpoint, resume_time: DateTime<Utc>) -> Self {
        let prior_elapsed_seconds = seconds_between(checkpoint.start_time, resume_time).max(0.0);
        Self {
            state: SessionState::Recording,
            track: Track::from(checkpoint.points),
            start_time: Some(checkpoint.start_time),
            resume_time: Some(resume_time),
            prior_elapsed_seconds,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn resume_time(&self) -> Option<DateTime<Utc>> {
        self.resume_time
    }

    pub fn prior_elapsed_seconds(&self) -> f64 {
        self.prior_elapsed_seconds
    }

    /// Elapsed recording time as shown to the user
    ///
    /// After a resume this is `prior + (now - resume_time)`; the gap between
    /// the crash and the resume is already inside `prior`.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        match (self.state, self.start_time) {
            (SessionState::Recording, Some(start)) => match self.resume_time {
                Some(resumed) => self.prior_elapsed_seconds + seconds_between(resumed, now),
                None => seconds_between(start, now),
            },
            _ => 0.0,
        }
    }

    pub(crate) fn checkpoint(&self) -> Option<Checkpoint> {
        self.start_time
            .map(|start| Checkpoint::new(self.track.points().to_vec(), start))
    }

    /// Seal the session; the returned track is never mutated again
    pub(crate) fn finish(mut self, end_time: DateTime<Utc>) -> FinishedTrack {
        self.state = SessionState::Finished;
        let start_time = self.start_time.unwrap_or(end_time);
        FinishedTrack::new(self.track, start_time, end_time)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

/// Read-only view of the live session for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStats {
    pub state: SessionState,
    pub elapsed_seconds: f64,
    pub distance_meters: f64,
    pub point_count: usize,
}

impl LiveStats {
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            elapsed_seconds: 0.0,
            distance_meters: 0.0,
            point_count: 0,
        }
    }
}
