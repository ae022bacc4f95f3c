use crate::analytics::SplitConfig;
use crate::session::LiveSession;
use crate::source::FixInlet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one session this device records
    pub session: Arc<Mutex<LiveSession>>,

    /// Where pushed fixes go; wired to the session's `ChannelSource`
    pub inlet: FixInlet,

    pub split: SplitConfig,
}

impl AppState {
    pub fn new(session: LiveSession, inlet: FixInlet) -> Self {
        let split = session.config().split;
        Self {
            session: Arc::new(Mutex::new(session)),
            inlet,
            split,
        }
    }
}
