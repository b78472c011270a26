pub mod client;
pub mod protocol;

pub use client::{GazeService, HttpGazeService, RemoteError};
pub use protocol::{ComposeState, FrameReport};
