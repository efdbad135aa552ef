//! In-process automated player.
//!
//! Answers every move request it receives with a move picked by its
//! `MoveChooser`, after a configurable think time.

use std::time::Duration;

use dotbox_shared::{
    dto::{EncodedMove, MoveRequest, MoveSubmission, ServerMessage},
    game::{GameState, MoveChooser},
};

use crate::domain::{ConnectionId, MoveResponseHandler, MoveSource, MoveSourceError, PlayerKind};

pub struct LocalAutomatedPlayer {
    id: ConnectionId,
    chooser: Box<dyn MoveChooser>,
    think_time: Duration,
    handler: Option<MoveResponseHandler>,
}

impl LocalAutomatedPlayer {
    /// A non-zero `think_time` delays each answer on the tokio runtime.
    pub fn new(chooser: Box<dyn MoveChooser>, think_time: Duration) -> Self {
        Self {
            id: ConnectionId::generate(),
            chooser,
            think_time,
            handler: None,
        }
    }

    fn answer(&mut self, request: &MoveRequest) {
        let Some(handler) = self.handler.clone() else {
            tracing::debug!("Local player {} is not listening, ignoring request", self.id);
            return;
        };
        let state = match GameState::try_from(request.encoded_game_state.clone()) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Local player {} could not decode state: {}", self.id, e);
                return;
            }
        };
        let Some(mv) = self.chooser.choose(&state) else {
            tracing::warn!("Local player {} found no legal move", self.id);
            return;
        };

        let submission = MoveSubmission::new(request.request_id, EncodedMove::from(&mv));
        if self.think_time.is_zero() {
            handler(submission);
        } else {
            let think_time = self.think_time;
            tokio::spawn(async move {
                tokio::time::sleep(think_time).await;
                handler(submission);
            });
        }
    }
}

impl MoveSource for LocalAutomatedPlayer {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::LocalAutomated
    }

    fn send(&mut self, message: &ServerMessage) -> Result<(), MoveSourceError> {
        if let ServerMessage::RequestMove(request) = message {
            self.answer(request);
        }
        Ok(())
    }

    fn on_move_submitted(&mut self, handler: MoveResponseHandler) {
        self.handler = Some(handler);
    }

    fn remove_move_listeners(&mut self) {
        self.handler = None;
    }

    fn disconnect(&mut self) {
        self.handler = None;
    }
}
