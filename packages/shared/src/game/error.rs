//! Errors raised by the board model and the game state.

use thiserror::Error;

use super::board::{MIN_BOARD_SIZE, Move};

/// Why a move was rejected by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveReason {
    /// Coordinates fall outside `[0, size)`
    #[error("coordinates are out of bounds")]
    OutOfBounds,

    /// The targeted edge does not exist at the grid boundary
    #[error("no such edge at the grid boundary")]
    NoSuchEdge,

    /// The targeted edge has already been claimed
    #[error("edge is already claimed")]
    EdgeAlreadyClaimed,
}

/// Game-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Board construction with fewer dots per side than allowed
    #[error("board size must be at least {min}, got {0}", min = MIN_BOARD_SIZE)]
    InvalidSize(usize),

    /// Move rejected by the board
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: IllegalMoveReason },

    /// No further moves are accepted once the game is over
    #[error("game is already over")]
    GameOver,
}
