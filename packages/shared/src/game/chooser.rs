//! Move choosers: pluggable strategies that pick a move for a given state.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{board::Move, state::GameState};

/// Picks the next move for the player whose turn it is
pub trait MoveChooser: Send {
    /// Returns `None` when the state offers no legal move.
    fn choose(&mut self, state: &GameState) -> Option<Move>;
}

/// Chooses uniformly among the legal moves
#[derive(Debug)]
pub struct RandomMoveChooser {
    rng: StdRng,
}

impl RandomMoveChooser {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic chooser, for reproducible games
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoveChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveChooser for RandomMoveChooser {
    fn choose(&mut self, state: &GameState) -> Option<Move> {
        state.legal_moves().choose(&mut self.rng).copied()
    }
}
