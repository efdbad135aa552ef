//! Wire encodings of the game state and moves, and the conversions between
//! them and the domain types.
//!
//! The encoded shapes mirror the domain model field for field so that
//! `decode(encode(state))` reproduces an equal state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Board, BoxCell, Dot, Edge, GameError, GameState, MIN_BOARD_SIZE, Move, Player};

/// Ownership as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ownership {
    None,
    Player1,
    Player2,
}

impl From<Option<Player>> for Ownership {
    fn from(player: Option<Player>) -> Self {
        match player {
            None => Ownership::None,
            Some(Player::Player1) => Ownership::Player1,
            Some(Player::Player2) => Ownership::Player2,
        }
    }
}

impl From<Ownership> for Option<Player> {
    fn from(ownership: Ownership) -> Self {
        match ownership {
            Ownership::None => None,
            Ownership::Player1 => Some(Player::Player1),
            Ownership::Player2 => Some(Player::Player2),
        }
    }
}

impl From<Edge> for Ownership {
    fn from(edge: Edge) -> Self {
        edge.owner().into()
    }
}

impl From<Ownership> for Edge {
    fn from(ownership: Ownership) -> Self {
        match Option::<Player>::from(ownership) {
            None => Edge::Unclaimed,
            Some(player) => Edge::Claimed(player),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedDot {
    pub x: usize,
    pub y: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_edge: Option<Ownership>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_edge: Option<Ownership>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedBox {
    pub x: usize,
    pub y: usize,
    pub ownership: Ownership,
}

/// Full game state snapshot, grids indexed `[x][y]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedGameState {
    pub turn: u32,
    pub board_size: usize,
    pub dots: Vec<Vec<EncodedDot>>,
    pub boxes: Vec<Vec<EncodedBox>>,
    pub players_turn: Player,
    pub game_over: bool,
    pub victor: Ownership,
    /// Why a forced finish happened, e.g. a forfeit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedMove {
    pub x: i32,
    pub y: i32,
    pub is_horizontal: bool,
    pub made_by: Ownership,
}

/// Errors raised while decoding an encoded game state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("expected a {expected}x{expected} grid of {grid}, found {found} columns")]
    GridShape {
        grid: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{grid} at index ({x}, {y}) is labelled ({label_x}, {label_y})")]
    CoordinateMismatch {
        grid: &'static str,
        x: usize,
        y: usize,
        label_x: usize,
        label_y: usize,
    },

    #[error("dot ({x}, {y}) has an edge slot that does not match the grid boundary")]
    EdgeShape { x: usize, y: usize },
}

// ========================================
// Domain → Encoded
// ========================================

impl From<&Dot> for EncodedDot {
    fn from(dot: &Dot) -> Self {
        Self {
            x: dot.x,
            y: dot.y,
            horizontal_edge: dot.horizontal_edge.map(Ownership::from),
            vertical_edge: dot.vertical_edge.map(Ownership::from),
        }
    }
}

impl From<&BoxCell> for EncodedBox {
    fn from(cell: &BoxCell) -> Self {
        Self {
            x: cell.x,
            y: cell.y,
            ownership: cell.ownership.into(),
        }
    }
}

impl From<&GameState> for EncodedGameState {
    fn from(state: &GameState) -> Self {
        let board = state.board();
        Self {
            turn: state.turn(),
            board_size: board.size(),
            dots: board
                .dots()
                .iter()
                .map(|column| column.iter().map(EncodedDot::from).collect())
                .collect(),
            boxes: board
                .boxes()
                .iter()
                .map(|column| column.iter().map(EncodedBox::from).collect())
                .collect(),
            players_turn: state.players_turn(),
            game_over: state.is_game_over(),
            victor: state.victor().into(),
            end_reason: state.end_reason().map(str::to_string),
        }
    }
}

impl From<&Move> for EncodedMove {
    fn from(mv: &Move) -> Self {
        Self {
            x: mv.x,
            y: mv.y,
            is_horizontal: mv.is_horizontal,
            made_by: mv.made_by.into(),
        }
    }
}

// ========================================
// Encoded → Domain
// ========================================

impl From<EncodedMove> for Move {
    fn from(encoded: EncodedMove) -> Self {
        Self {
            x: encoded.x,
            y: encoded.y,
            is_horizontal: encoded.is_horizontal,
            made_by: encoded.made_by.into(),
        }
    }
}

impl TryFrom<EncodedGameState> for GameState {
    type Error = CodecError;

    fn try_from(encoded: EncodedGameState) -> Result<Self, Self::Error> {
        let size = encoded.board_size;
        if size < MIN_BOARD_SIZE {
            return Err(GameError::InvalidSize(size).into());
        }
        let last = size - 1;

        check_grid_shape("dots", &encoded.dots, size)?;
        check_grid_shape("boxes", &encoded.boxes, last)?;

        let mut dots = Vec::with_capacity(size);
        for (x, column) in encoded.dots.into_iter().enumerate() {
            let mut decoded = Vec::with_capacity(size);
            for (y, dot) in column.into_iter().enumerate() {
                check_label("dot", x, y, dot.x, dot.y)?;
                if dot.horizontal_edge.is_some() != (x < last)
                    || dot.vertical_edge.is_some() != (y < last)
                {
                    return Err(CodecError::EdgeShape { x, y });
                }
                decoded.push(Dot {
                    x,
                    y,
                    horizontal_edge: dot.horizontal_edge.map(Edge::from),
                    vertical_edge: dot.vertical_edge.map(Edge::from),
                });
            }
            dots.push(decoded);
        }

        let mut boxes = Vec::with_capacity(last);
        for (x, column) in encoded.boxes.into_iter().enumerate() {
            let mut decoded = Vec::with_capacity(last);
            for (y, cell) in column.into_iter().enumerate() {
                check_label("box", x, y, cell.x, cell.y)?;
                decoded.push(BoxCell {
                    x,
                    y,
                    ownership: cell.ownership.into(),
                });
            }
            boxes.push(decoded);
        }

        Ok(GameState::from_parts(
            encoded.turn,
            encoded.game_over,
            encoded.victor.into(),
            encoded.players_turn,
            encoded.end_reason,
            Board::from_grids(size, dots, boxes),
        ))
    }
}

fn check_grid_shape<T>(grid: &'static str, columns: &[Vec<T>], len: usize) -> Result<(), CodecError> {
    if columns.len() != len || columns.iter().any(|column| column.len() != len) {
        return Err(CodecError::GridShape {
            grid,
            expected: len,
            found: columns.len(),
        });
    }
    Ok(())
}

fn check_label(
    grid: &'static str,
    x: usize,
    y: usize,
    label_x: usize,
    label_y: usize,
) -> Result<(), CodecError> {
    if (x, y) != (label_x, label_y) {
        return Err(CodecError::CoordinateMismatch {
            grid,
            x,
            y,
            label_x,
            label_y,
        });
    }
    Ok(())
}
