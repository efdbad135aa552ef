//! Board model: a square grid of dots, the edges between them and the boxes
//! those edges enclose.
//!
//! Grids are indexed `[x][y]`. The dot at `(x, y)` owns the horizontal edge
//! towards `(x + 1, y)` and the vertical edge towards `(x, y + 1)`; the box at
//! `(x, y)` has that dot as its top-left corner.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{GameError, IllegalMoveReason};

/// Smallest number of dots per side that still encloses a box
pub const MIN_BOARD_SIZE: usize = 2;

/// One of the two seats at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    /// Both players in roster order
    pub const ALL: [Player; 2] = [Player::Player1, Player::Player2];

    /// The other player
    pub fn opponent(self) -> Self {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// Roster index (0 for Player1, 1 for Player2)
    pub fn index(self) -> usize {
        match self {
            Player::Player1 => 0,
            Player::Player2 => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Player1 => write!(f, "PLAYER1"),
            Player::Player2 => write!(f, "PLAYER2"),
        }
    }
}

/// Ownership state of an edge that exists on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    #[default]
    Unclaimed,
    Claimed(Player),
}

impl Edge {
    pub fn owner(self) -> Option<Player> {
        match self {
            Edge::Unclaimed => None,
            Edge::Claimed(player) => Some(player),
        }
    }

    pub fn is_claimed(self) -> bool {
        matches!(self, Edge::Claimed(_))
    }
}

/// Grid intersection, origin of up to two claimable edges.
///
/// An edge slot is `None` when the edge would leave the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot {
    pub x: usize,
    pub y: usize,
    pub horizontal_edge: Option<Edge>,
    pub vertical_edge: Option<Edge>,
}

impl Dot {
    fn edge(&self, is_horizontal: bool) -> Option<Edge> {
        if is_horizontal {
            self.horizontal_edge
        } else {
            self.vertical_edge
        }
    }

    fn edge_mut(&mut self, is_horizontal: bool) -> Option<&mut Edge> {
        if is_horizontal {
            self.horizontal_edge.as_mut()
        } else {
            self.vertical_edge.as_mut()
        }
    }
}

/// Unit cell bounded by four edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxCell {
    pub x: usize,
    pub y: usize,
    pub ownership: Option<Player>,
}

/// A single edge claim.
///
/// Coordinates are signed so that out-of-range input from the wire can be
/// represented and rejected instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub x: i32,
    pub y: i32,
    pub is_horizontal: bool,
    pub made_by: Option<Player>,
}

impl Move {
    pub fn new(x: i32, y: i32, is_horizontal: bool) -> Self {
        Self {
            x,
            y,
            is_horizontal,
            made_by: None,
        }
    }

    pub fn horizontal(x: i32, y: i32) -> Self {
        Self::new(x, y, true)
    }

    pub fn vertical(x: i32, y: i32) -> Self {
        Self::new(x, y, false)
    }

    /// Tag the move with the player who made it
    pub fn made_by(self, player: Player) -> Self {
        Self {
            made_by: Some(player),
            ..self
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.is_horizontal {
            "horizontal"
        } else {
            "vertical"
        };
        write!(f, "({}, {}) {}", self.x, self.y, direction)
    }
}

/// The dot grid and its boxes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    dots: Vec<Vec<Dot>>,
    boxes: Vec<Vec<BoxCell>>,
}

impl Board {
    /// Allocate `size × size` dots and `(size-1) × (size-1)` boxes, all unclaimed.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidSize` if `size < 2`.
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size < MIN_BOARD_SIZE {
            return Err(GameError::InvalidSize(size));
        }

        let last = size - 1;
        let dots = (0..size)
            .map(|x| {
                (0..size)
                    .map(|y| Dot {
                        x,
                        y,
                        horizontal_edge: (x < last).then_some(Edge::Unclaimed),
                        vertical_edge: (y < last).then_some(Edge::Unclaimed),
                    })
                    .collect()
            })
            .collect();
        let boxes = (0..last)
            .map(|x| {
                (0..last)
                    .map(|y| BoxCell {
                        x,
                        y,
                        ownership: None,
                    })
                    .collect()
            })
            .collect();

        Ok(Self { size, dots, boxes })
    }

    /// Assemble a board from grids that the caller has already validated.
    pub(crate) fn from_grids(size: usize, dots: Vec<Vec<Dot>>, boxes: Vec<Vec<BoxCell>>) -> Self {
        Self { size, dots, boxes }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dots(&self) -> &[Vec<Dot>] {
        &self.dots
    }

    pub fn boxes(&self) -> &[Vec<BoxCell>] {
        &self.boxes
    }

    pub fn dot(&self, x: usize, y: usize) -> Option<&Dot> {
        self.dots.get(x).and_then(|column| column.get(y))
    }

    pub fn box_at(&self, x: usize, y: usize) -> Option<&BoxCell> {
        self.boxes.get(x).and_then(|column| column.get(y))
    }

    /// Check a move against the board without applying it.
    pub fn check_move(&self, mv: &Move) -> Result<(), IllegalMoveReason> {
        self.locate(mv).map(|_| ())
    }

    pub fn is_move_legal(&self, mv: &Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// Claim the targeted edge for `player` and capture any box it completes.
    ///
    /// Returns `true` iff at least one box was captured by this move.
    ///
    /// # Errors
    ///
    /// Returns `GameError::IllegalMove` and leaves the board untouched when the
    /// move is illegal.
    pub fn apply_move(&mut self, mv: &Move, player: Player) -> Result<bool, GameError> {
        let (x, y) = self
            .locate(mv)
            .map_err(|reason| GameError::IllegalMove { mv: *mv, reason })?;

        if let Some(edge) = self.dots[x][y].edge_mut(mv.is_horizontal) {
            *edge = Edge::Claimed(player);
        }

        let mut captured = false;
        for (bx, by) in self.adjacent_boxes(x, y, mv.is_horizontal) {
            if self.boxes[bx][by].ownership.is_none() && self.is_box_complete(bx, by) {
                self.boxes[bx][by].ownership = Some(player);
                captured = true;
            }
        }

        Ok(captured)
    }

    /// Every unclaimed edge, `x` outermost then `y`, horizontal before vertical.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.dots
            .iter()
            .flatten()
            .flat_map(|dot| {
                [true, false]
                    .into_iter()
                    .filter(move |&is_horizontal| dot.edge(is_horizontal) == Some(Edge::Unclaimed))
                    .map(move |is_horizontal| Move::new(dot.x as i32, dot.y as i32, is_horizontal))
            })
            .collect()
    }

    /// Number of boxes owned by `player`
    pub fn box_count(&self, player: Player) -> usize {
        self.boxes
            .iter()
            .flatten()
            .filter(|cell| cell.ownership == Some(player))
            .count()
    }

    fn locate(&self, mv: &Move) -> Result<(usize, usize), IllegalMoveReason> {
        let in_bounds = |value: i32| usize::try_from(value).ok().filter(|&v| v < self.size);
        let (Some(x), Some(y)) = (in_bounds(mv.x), in_bounds(mv.y)) else {
            return Err(IllegalMoveReason::OutOfBounds);
        };

        match self.dots[x][y].edge(mv.is_horizontal) {
            None => Err(IllegalMoveReason::NoSuchEdge),
            Some(Edge::Claimed(_)) => Err(IllegalMoveReason::EdgeAlreadyClaimed),
            Some(Edge::Unclaimed) => Ok((x, y)),
        }
    }

    /// Boxes on either side of the edge that starts at dot `(x, y)`
    fn adjacent_boxes(&self, x: usize, y: usize, is_horizontal: bool) -> Vec<(usize, usize)> {
        let last = self.size - 1;
        let mut adjacent = Vec::with_capacity(2);
        if is_horizontal {
            if y > 0 {
                adjacent.push((x, y - 1));
            }
            if y < last {
                adjacent.push((x, y));
            }
        } else {
            if x > 0 {
                adjacent.push((x - 1, y));
            }
            if x < last {
                adjacent.push((x, y));
            }
        }
        adjacent
    }

    fn is_box_complete(&self, bx: usize, by: usize) -> bool {
        let claimed = |edge: Option<Edge>| edge.is_some_and(Edge::is_claimed);
        claimed(self.dots[bx][by].horizontal_edge)
            && claimed(self.dots[bx][by].vertical_edge)
            && claimed(self.dots[bx + 1][by].vertical_edge)
            && claimed(self.dots[bx][by + 1].horizontal_edge)
    }
}
