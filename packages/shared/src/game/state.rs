//! Game state: a board plus turn ownership and the terminal outcome.

use super::{
    board::{Board, Move, Player},
    error::GameError,
};

/// Result of applying one move through the game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The move as applied, tagged with the player who made it
    pub applied: Move,
    /// Whether the move captured at least one box
    pub captured: bool,
    /// Whether the move ended the game
    pub game_over: bool,
}

/// Authoritative state of one round.
///
/// A finished state is never reset in place; a new round builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    turn: u32,
    game_over: bool,
    victor: Option<Player>,
    players_turn: Player,
    end_reason: Option<String>,
    board: Board,
}

impl GameState {
    /// Build a fresh state with an empty board.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidSize` if `board_size < 2`.
    pub fn new(board_size: usize, first_player: Player) -> Result<Self, GameError> {
        Ok(Self {
            turn: 0,
            game_over: false,
            victor: None,
            players_turn: first_player,
            end_reason: None,
            board: Board::new(board_size)?,
        })
    }

    /// Reassemble a state from decoded parts.
    pub(crate) fn from_parts(
        turn: u32,
        game_over: bool,
        victor: Option<Player>,
        players_turn: Player,
        end_reason: Option<String>,
        board: Board,
    ) -> Self {
        Self {
            turn,
            game_over,
            victor,
            players_turn,
            end_reason,
            board,
        }
    }

    /// Number of moves applied so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Winner once the game is over; `None` while in progress or on a draw
    pub fn victor(&self) -> Option<Player> {
        self.victor
    }

    pub fn players_turn(&self) -> Player {
        self.players_turn
    }

    pub fn board_size(&self) -> usize {
        self.board.size()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Why the game ended, when it was ended by `set_winner`
    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves()
    }

    /// Boxes owned by `player`
    pub fn score(&self, player: Player) -> usize {
        self.board.box_count(player)
    }

    /// Apply a move on behalf of the player whose turn it is.
    ///
    /// A capture keeps the turn with the same player; otherwise the turn
    /// passes. When no legal move remains the game ends and the player with
    /// more boxes wins, or nobody on an equal split.
    ///
    /// # Errors
    ///
    /// `GameError::GameOver` once the game has ended, or
    /// `GameError::IllegalMove` from the board. The state is unchanged on error.
    pub fn apply_player_move(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }

        let player = self.players_turn;
        let applied = mv.made_by(player);
        let captured = self.board.apply_move(&applied, player)?;
        self.turn += 1;

        if self.board.legal_moves().is_empty() {
            self.finish_by_score();
        } else if !captured {
            self.toggle_turn(None);
        }

        Ok(MoveOutcome {
            applied,
            captured,
            game_over: self.game_over,
        })
    }

    /// Force the game into its terminal state, bypassing the legal-move check.
    pub fn set_winner(&mut self, winner: Option<Player>, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::info!(
            "Game over: victor {}, reason: {}",
            winner.map_or_else(|| "none".to_string(), |p| p.to_string()),
            reason
        );
        self.game_over = true;
        self.victor = winner;
        self.end_reason = Some(reason);
    }

    /// Hand the turn to `explicit_player`, or to the other player when `None`.
    pub fn toggle_turn(&mut self, explicit_player: Option<Player>) -> Player {
        self.players_turn = explicit_player.unwrap_or_else(|| self.players_turn.opponent());
        self.players_turn
    }

    fn finish_by_score(&mut self) {
        let player1 = self.score(Player::Player1);
        let player2 = self.score(Player::Player2);
        self.game_over = true;
        self.victor = match player1.cmp(&player2) {
            std::cmp::Ordering::Greater => Some(Player::Player1),
            std::cmp::Ordering::Less => Some(Player::Player2),
            std::cmp::Ordering::Equal => None,
        };
        tracing::info!(
            "Board complete after {} moves: PLAYER1 {} - {} PLAYER2",
            self.turn,
            player1,
            player2
        );
    }
}
