pub mod backend;
pub mod channel;
pub mod replay;

pub use backend::{FixEvent, FixSource};
pub use channel::{ChannelSource, FixInlet};
pub use replay::ReplaySource;
