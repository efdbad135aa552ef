//! `MoveSource` implementations.
//!
//! - `remote`: a WebSocket connection, driven by the UI layer
//! - `local`: an in-process automated player

mod local;
mod remote;

pub use local::LocalAutomatedPlayer;
pub use remote::{OutboundFrame, RemoteConnection, SubmissionRouter};
