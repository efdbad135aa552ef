use std::time::Duration;

use crate::domain::{GameMode, InvalidResponsePolicy};

pub const DEFAULT_BOARD_SIZE: usize = 8;
pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_ROUND_RESTART_DELAY: Duration = Duration::from_millis(3000);

/// Tunables of one game session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Dots per side
    pub board_size: usize,
    pub mode: GameMode,
    /// How long a player has to answer a move request
    pub move_timeout: Duration,
    /// Think time of local automated players
    pub processing_delay: Duration,
    /// Pause before the next round starts automatically in screensaver mode
    pub round_restart_delay: Duration,
    pub invalid_response_policy: InvalidResponsePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            mode: GameMode::default(),
            move_timeout: DEFAULT_MOVE_TIMEOUT,
            processing_delay: DEFAULT_PROCESSING_DELAY,
            round_restart_delay: DEFAULT_ROUND_RESTART_DELAY,
            invalid_response_policy: InvalidResponsePolicy::default(),
        }
    }
}
