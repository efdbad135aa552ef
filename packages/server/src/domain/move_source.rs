//! The capability the coordinator uses to talk to anything that supplies moves.
//!
//! A move source is either a remote WebSocket connection or a local automated
//! player; observers are move sources that never receive move requests.

use std::sync::Arc;

use thiserror::Error;

use dotbox_shared::dto::{MoveSubmission, ServerMessage};

use super::connection::{ConnectionId, PlayerKind};

/// Callback invoked for every move submitted through a source
pub type MoveResponseHandler = Arc<dyn Fn(MoveSubmission) + Send + Sync>;

/// Creates the local automated players used to fill empty slots
pub type AutomatedPlayerFactory = Box<dyn FnMut() -> Box<dyn MoveSource> + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveSourceError {
    #[error("connection is closed")]
    Disconnected,

    #[error("failed to serialize message: {0}")]
    Serialization(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait MoveSource: Send {
    fn id(&self) -> ConnectionId;

    fn kind(&self) -> PlayerKind;

    /// Deliver one message to the other side
    fn send(&mut self, message: &ServerMessage) -> Result<(), MoveSourceError>;

    /// Route every subsequent move submission to `handler`, replacing any previous one
    fn on_move_submitted(&mut self, handler: MoveResponseHandler);

    /// Stop routing move submissions; later submissions are dropped
    fn remove_move_listeners(&mut self);

    /// Close the underlying connection
    fn disconnect(&mut self);
}
