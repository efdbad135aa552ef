//! Game domain: board, game state and move choosers.
//!
//! Pure data structures and rules. Nothing in here performs I/O.

mod board;
mod chooser;
mod error;
mod state;

pub use board::{Board, BoxCell, Dot, Edge, MIN_BOARD_SIZE, Move, Player};
pub use chooser::{MoveChooser, RandomMoveChooser};
pub use error::{GameError, IllegalMoveReason};
pub use state::{GameState, MoveOutcome};
