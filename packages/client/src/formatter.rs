//! Text formatting utilities for client display.

use dotbox_shared::{
    dto::{CodecError, StateUpdate},
    game::{Board, GameState, Move, Player},
    time::timestamp_to_rfc3339,
};

const RULE: &str = "============================================================";

/// Formatter for game messages
pub struct GameFormatter;

impl GameFormatter {
    /// Draw the board with `+` for dots, `---` and `|` for claimed edges and
    /// the owner's number inside captured boxes
    pub fn render_board(board: &Board) -> String {
        let size = board.size();
        let mut output = String::new();

        for y in 0..size {
            for x in 0..size {
                output.push('+');
                if x + 1 < size {
                    let claimed = board
                        .dot(x, y)
                        .and_then(|dot| dot.horizontal_edge)
                        .is_some_and(|edge| edge.is_claimed());
                    output.push_str(if claimed { "---" } else { "   " });
                }
            }
            output.push('\n');

            if y + 1 < size {
                for x in 0..size {
                    let claimed = board
                        .dot(x, y)
                        .and_then(|dot| dot.vertical_edge)
                        .is_some_and(|edge| edge.is_claimed());
                    output.push(if claimed { '|' } else { ' ' });
                    if x + 1 < size {
                        let owner = board.box_at(x, y).and_then(|cell| cell.ownership);
                        output.push_str(match owner {
                            Some(Player::Player1) => " 1 ",
                            Some(Player::Player2) => " 2 ",
                            None => "   ",
                        });
                    }
                }
                output.push('\n');
            }
        }

        output
    }

    /// Format a state update for an observer
    ///
    /// # Errors
    ///
    /// Returns the decoding error when the encoded state is malformed.
    pub fn format_state_update(update: &StateUpdate) -> Result<String, CodecError> {
        let state = GameState::try_from(update.encoded_game_state.clone())?;
        let name_of = |player: Player| update.player_names.get(player).unwrap_or("(empty)");
        let sent_at =
            timestamp_to_rfc3339(update.sent_at).unwrap_or_else(|| update.sent_at.to_string());

        let mut output = format!("\n{}\n", RULE);
        output.push_str(&format!(
            "PLAYER1 {} [{}] vs PLAYER2 {} [{}]\n",
            name_of(Player::Player1),
            state.score(Player::Player1),
            name_of(Player::Player2),
            state.score(Player::Player2)
        ));
        output.push_str(&format!("turn {} at {}\n", state.turn(), sent_at));
        if let Some(last) = update.encoded_last_move {
            output.push_str(&format!("last move: {}\n", Move::from(last)));
        }
        output.push('\n');
        output.push_str(&Self::render_board(state.board()));
        output.push('\n');
        if state.is_game_over() {
            match state.victor() {
                Some(victor) => output.push_str(&format!(
                    "Game over: {} ({}) wins",
                    victor,
                    name_of(victor)
                )),
                None => output.push_str("Game over: draw"),
            }
            if let Some(reason) = state.end_reason() {
                output.push_str(&format!(", {}", reason));
            }
            output.push('\n');
        } else {
            output.push_str(&format!("{} to move\n", update.current_turn_role));
        }
        output.push_str(RULE);
        output.push('\n');
        Ok(output)
    }

    /// Format the role assignment
    pub fn format_assignment(slot: Option<Player>) -> String {
        match slot {
            Some(slot) => format!("\nSeated as {}\n", slot),
            None => "\nWatching as an observer\n".to_string(),
        }
    }

    /// Format the move a bot is about to submit
    pub fn format_move_choice(player: Player, mv: &Move, expected_by: i64) -> String {
        let deadline =
            timestamp_to_rfc3339(expected_by).unwrap_or_else(|| expected_by.to_string());
        format!("{} plays {} (answer due by {})\n", player, mv, deadline)
    }
}
