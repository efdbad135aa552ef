//! UseCase layer: the game session and the task that drives it.

mod config;
mod event;
mod play_game;
mod session_actor;

pub use config::{
    DEFAULT_BOARD_SIZE, DEFAULT_MOVE_TIMEOUT, DEFAULT_PROCESSING_DELAY,
    DEFAULT_ROUND_RESTART_DELAY, SessionConfig,
};
pub use event::SessionEvent;
pub use play_game::{IgnoredResponse, ResponseOutcome, Session};
pub use session_actor::SessionHandle;
