//! Errors of the session domain.

use thiserror::Error;

use dotbox_shared::game::{GameError, Player};

/// Session lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Both player slots are occupied
    #[error("both player slots are already filled")]
    SessionFull,

    /// A round cannot start while a player slot is empty
    #[error("cannot start a round, {0} slot is empty")]
    IncompleteRoster(Player),

    /// The operation needs a round that has been started
    #[error("no round has been started yet")]
    RoundNotStarted,

    /// The operation is not allowed once a round has been started
    #[error("a round has already been started")]
    RoundInProgress,

    /// The session task has stopped
    #[error("session is no longer running")]
    SessionClosed,

    /// Game state construction failed
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("player name must not be empty")]
    PlayerNameEmpty,

    #[error("player name must be at most {max} characters, got {actual}")]
    PlayerNameTooLong { max: usize, actual: usize },
}
