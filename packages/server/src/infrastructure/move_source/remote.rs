//! WebSocket-backed `MoveSource`.
//!
//! The WebSocket itself is owned by the UI layer (`ui/handler/websocket.rs`).
//! This type only holds the outbound channel feeding that socket and the slot
//! where the session installs its move handler; the UI layer hands inbound
//! submissions to the matching `SubmissionRouter`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use dotbox_shared::dto::{MoveSubmission, ServerMessage};

use crate::domain::{ConnectionId, MoveResponseHandler, MoveSource, MoveSourceError, PlayerKind};

/// Frame queued for the socket writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close,
}

type HandlerSlot = Arc<Mutex<Option<MoveResponseHandler>>>;

fn lock(slot: &HandlerSlot) -> MutexGuard<'_, Option<MoveResponseHandler>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RemoteConnection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    handler: HandlerSlot,
}

impl RemoteConnection {
    /// Create the session-side half of a connection and the router the socket
    /// reader uses to deliver submissions.
    pub fn new(
        id: ConnectionId,
        outbound: mpsc::UnboundedSender<OutboundFrame>,
    ) -> (Self, SubmissionRouter) {
        let handler = HandlerSlot::default();
        let router = SubmissionRouter {
            id,
            handler: handler.clone(),
        };
        (
            Self {
                id,
                outbound,
                handler,
            },
            router,
        )
    }
}

impl MoveSource for RemoteConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Remote
    }

    fn send(&mut self, message: &ServerMessage) -> Result<(), MoveSourceError> {
        let json = serde_json::to_string(message)
            .map_err(|e| MoveSourceError::Serialization(e.to_string()))?;
        self.outbound
            .send(OutboundFrame::Text(json))
            .map_err(|_| MoveSourceError::Disconnected)
    }

    fn on_move_submitted(&mut self, handler: MoveResponseHandler) {
        *lock(&self.handler) = Some(handler);
    }

    fn remove_move_listeners(&mut self) {
        *lock(&self.handler) = None;
    }

    fn disconnect(&mut self) {
        self.remove_move_listeners();
        if self.outbound.send(OutboundFrame::Close).is_err() {
            tracing::debug!("Connection {} was already closed", self.id);
        }
    }
}

/// Inbound side of a `RemoteConnection`
#[derive(Clone)]
pub struct SubmissionRouter {
    id: ConnectionId,
    handler: HandlerSlot,
}

impl SubmissionRouter {
    /// Hand a submission to the installed handler.
    ///
    /// Returns `false` when no handler is installed and the submission was dropped.
    pub fn deliver(&self, submission: MoveSubmission) -> bool {
        // Clone out of the lock so the handler never runs while holding it.
        let handler = lock(&self.handler).clone();
        match handler {
            Some(handler) => {
                handler(submission);
                true
            }
            None => {
                tracing::debug!("Dropping move from {}: no listener installed", self.id);
                false
            }
        }
    }
}
