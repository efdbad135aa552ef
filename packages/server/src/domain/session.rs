//! Session configuration values and read models.

use std::fmt;

use uuid::Uuid;

use dotbox_shared::game::{GameState, IllegalMoveReason, Move, Player};

use super::connection::{ConnectionId, PlayerKind};

/// How the player slots get filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameMode {
    /// Two remote players
    #[default]
    Standard,
    /// One remote player against a local automated player
    Solo,
    /// Two local automated players, restarting forever
    Screensaver,
}

impl GameMode {
    /// Number of empty slots a local automated player may fill at round start
    pub fn automated_fill_ins(&self) -> usize {
        match self {
            Self::Standard => 0,
            Self::Solo => 1,
            Self::Screensaver => 2,
        }
    }

    /// Whether a round needs at least one remote player seated
    pub fn requires_remote_player(&self) -> bool {
        matches!(self, Self::Solo)
    }
}

/// What happens when the player being asked answers with a missing or illegal move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidResponsePolicy {
    /// The responding player loses the round
    #[default]
    Forfeit,
    /// The same player is asked again with a fresh request
    Reissue,
}

/// Why a player lost a round without finishing the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForfeitReason {
    Timeout,
    MissingMovePayload,
    IllegalMove(IllegalMoveReason),
    Disconnected,
}

impl fmt::Display for ForfeitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("did not answer in time"),
            Self::MissingMovePayload => f.write_str("answered without a move"),
            Self::IllegalMove(reason) => write!(f, "played an illegal move ({})", reason),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// The current round has not been started
    NotStarted,
    InProgress,
    /// Ended by the operator before the board was complete
    Suspended,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub slot: Player,
    pub name: String,
    pub kind: PlayerKind,
    pub connection_id: ConnectionId,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub round: u32,
    pub phase: RoundPhase,
    pub mode: GameMode,
    pub players: Vec<PlayerSummary>,
    pub observer_count: usize,
    pub state: GameState,
    pub last_move: Option<Move>,
    pub outstanding_request: Option<Uuid>,
}
