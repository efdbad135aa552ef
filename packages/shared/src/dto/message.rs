//! Message catalogue exchanged over the WebSocket connection.
//!
//! Every frame is a JSON object whose `type` field names the message:
//!
//! | type           | direction                    |
//! |----------------|------------------------------|
//! | `ASSIGN_ROLE`  | server → client              |
//! | `REQUEST_MOVE` | server → current player      |
//! | `SUBMIT_MOVE`  | player → server              |
//! | `STATE_UPDATE` | server → observers           |

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::codec::{EncodedGameState, EncodedMove};
use crate::game::Player;

/// Role requested by a connecting client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    Player,
    Observer,
}

/// Messages sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    AssignRole(AssignRole),
    RequestMove(MoveRequest),
    StateUpdate(StateUpdate),
}

/// Messages sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    SubmitMove(MoveSubmission),
}

/// Tells a client what it is: a player in a given slot, or an observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRole {
    pub role: ConnectionRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<Player>,
}

/// Solicits a move from the player whose turn it is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub role: Player,
    /// Unix milliseconds
    pub sent_at: i64,
    /// Unix milliseconds
    pub expected_by: i64,
    pub request_id: Uuid,
    pub encoded_game_state: EncodedGameState,
    #[serde(default)]
    pub encoded_last_move: Option<EncodedMove>,
}

/// A player's answer to a `MoveRequest`.
///
/// Both fields are optional on the wire so that incomplete answers can be
/// received and dealt with by the coordinator instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSubmission {
    #[serde(default)]
    pub request_id: Option<Uuid>,
    #[serde(default)]
    pub encoded_move: Option<EncodedMove>,
}

impl MoveSubmission {
    pub fn new(request_id: Uuid, encoded_move: EncodedMove) -> Self {
        Self {
            request_id: Some(request_id),
            encoded_move: Some(encoded_move),
        }
    }
}

/// Display names of both players
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    #[serde(rename = "PLAYER1", default)]
    pub player1: Option<String>,
    #[serde(rename = "PLAYER2", default)]
    pub player2: Option<String>,
}

impl PlayerNames {
    pub fn get(&self, player: Player) -> Option<&str> {
        match player {
            Player::Player1 => self.player1.as_deref(),
            Player::Player2 => self.player2.as_deref(),
        }
    }
}

/// Read-only snapshot pushed to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub current_turn_role: Player,
    pub player_names: PlayerNames,
    /// Unix milliseconds
    pub sent_at: i64,
    pub encoded_game_state: EncodedGameState,
    #[serde(default)]
    pub encoded_last_move: Option<EncodedMove>,
}
