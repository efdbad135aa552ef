//! Turns server messages into replies and display text.

use dotbox_shared::{
    dto::{ClientMessage, ConnectionRole, EncodedMove, MoveRequest, MoveSubmission, ServerMessage},
    game::{GameState, MoveChooser, Player},
};

use super::{error::ClientError, formatter::GameFormatter};

/// What the session should do after a server message
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Message to send back to the server
    pub reply: Option<ClientMessage>,
    /// Text to print for the user
    pub display: Option<String>,
}

pub struct MessageHandler {
    role: ConnectionRole,
    chooser: Box<dyn MoveChooser>,
    slot: Option<Player>,
}

impl MessageHandler {
    pub fn new(role: ConnectionRole, chooser: Box<dyn MoveChooser>) -> Self {
        Self {
            role,
            chooser,
            slot: None,
        }
    }

    /// React to one server message.
    ///
    /// # Errors
    ///
    /// `ClientError::Protocol` when a move request carries a state that cannot
    /// be decoded or that offers no legal move.
    pub fn handle(&mut self, message: ServerMessage) -> Result<Reaction, ClientError> {
        match message {
            ServerMessage::AssignRole(assignment) => {
                if assignment.role != self.role {
                    tracing::warn!(
                        "Asked to join as {:?} but the server assigned {:?}",
                        self.role,
                        assignment.role
                    );
                }
                self.role = assignment.role;
                self.slot = assignment.slot;
                Ok(Reaction {
                    reply: None,
                    display: Some(GameFormatter::format_assignment(self.slot)),
                })
            }
            ServerMessage::RequestMove(request) => self.answer(request),
            ServerMessage::StateUpdate(update) => {
                let display = GameFormatter::format_state_update(&update)
                    .map_err(|e| ClientError::Protocol(e.to_string()))?;
                Ok(Reaction {
                    reply: None,
                    display: Some(display),
                })
            }
        }
    }

    fn answer(&mut self, request: MoveRequest) -> Result<Reaction, ClientError> {
        if self.role == ConnectionRole::Observer {
            tracing::warn!("Observer received a move request, ignoring it");
            return Ok(Reaction::default());
        }
        if let Some(slot) = self.slot
            && slot != request.role
        {
            tracing::warn!("Move requested for {} while seated as {}", request.role, slot);
        }

        let state = GameState::try_from(request.encoded_game_state)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        let mv = self
            .chooser
            .choose(&state)
            .ok_or_else(|| ClientError::Protocol("no legal move left to play".to_string()))?;
        tracing::debug!("Answering request {} with {}", request.request_id, mv);

        Ok(Reaction {
            reply: Some(ClientMessage::SubmitMove(MoveSubmission::new(
                request.request_id,
                EncodedMove::from(&mv),
            ))),
            display: Some(GameFormatter::format_move_choice(
                request.role,
                &mv,
                request.expected_by,
            )),
        })
    }
}
