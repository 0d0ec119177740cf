//! Expendibots game rules with stack-map board representation.
//!
//! # Board Model
//!
//! The board is an 8×8 grid. Each occupied square holds a *stack* of one or
//! more pieces of a single color. A board is two maps, one per color:
//!
//! ```text
//! white: {(3,2): 1, (0,1): 5}     Pos -> stack height
//! black: {(7,7): 3}
//! ```
//!
//! Invariants maintained by every constructor and apply method:
//! - no square appears in both maps,
//! - every stored height is >= 1 (a stack reaching 0 is removed, never kept).
//!
//! The maps are `BTreeMap` so that two boards with the same stacks compare
//! equal and hash identically regardless of how they were built; the search
//! layer dedups explored states on exactly this equality.
//!
//! # Actions
//!
//! - `Move { from, pieces, direction, steps }`: detach `pieces` from the
//!   stack at `from` and slide them `steps` squares in one of the four
//!   cardinal directions. The destination must be on the board and must not
//!   be enemy-occupied; landing on an own stack merges.
//! - `Boom { at }`: detonate the stack at `at`. The blast removes every
//!   stack of either color in the connected component of occupied squares
//!   around `at` under King adjacency (the 8 surrounding squares). Chain
//!   reactions fall out of the connectivity: any stack touching the blast
//!   area detonates too.
//!
//! Application is copy-on-write: `Board::apply` returns a new board and
//! never mutates the parent, so search nodes can share parent states.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board side length. Coordinates run in `[0, BOARD_SIZE)` on both axes.
pub const BOARD_SIZE: u8 = 8;

/// Piece color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Get the opposing side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// Square coordinates, `x` and `y` each in `[0, 8)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    /// Create a position. Callers must keep coordinates in range; validated
    /// entry points are `Board::from_stacks` and `Pos::checked`.
    #[inline]
    pub fn new(x: u8, y: u8) -> Pos {
        Pos { x, y }
    }

    /// Create a position, or None if either coordinate is off the board.
    #[inline]
    pub fn checked(x: u8, y: u8) -> Option<Pos> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Pos { x, y })
        } else {
            None
        }
    }

    /// The square `steps` squares away in `direction`, or None if it leaves
    /// the board.
    pub fn offset(self, direction: Direction, steps: u8) -> Option<Pos> {
        let (dx, dy) = direction.delta();
        let x = self.x as i16 + dx as i16 * steps as i16;
        let y = self.y as i16 + dy as i16 * steps as i16;
        if (0..BOARD_SIZE as i16).contains(&x) && (0..BOARD_SIZE as i16).contains(&y) {
            Some(Pos::new(x as u8, y as u8))
        } else {
            None
        }
    }

    /// The up-to-8 surrounding squares (King adjacency), clipped to the
    /// board. Does not include `self`.
    pub fn king_neighbors(self) -> impl Iterator<Item = Pos> {
        let (cx, cy) = (self.x as i16, self.y as i16);
        (-1i16..=1)
            .flat_map(move |dx| (-1i16..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter(move |&(x, y)| (x, y) != (cx, cy))
            .filter(|&(x, y)| (0..BOARD_SIZE as i16).contains(&x) && (0..BOARD_SIZE as i16).contains(&y))
            .map(|(x, y)| Pos::new(x as u8, y as u8))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four cardinal move directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All four directions, in a fixed enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit (dx, dy) step for this direction.
    #[inline]
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }
}

/// An action for one side.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Detach `pieces` from the stack at `from` and slide them `steps`
    /// squares in `direction`.
    Move {
        from: Pos,
        pieces: u8,
        direction: Direction,
        steps: u8,
    },
    /// Detonate the stack at `at`.
    Boom { at: Pos },
}

impl fmt::Display for Action {
    /// Referee notation: `MOVE n from (x, y) to (x, y).` / `BOOM at (x, y).`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Move {
                from,
                pieces,
                direction,
                steps,
            } => {
                let (dx, dy) = direction.delta();
                let tx = from.x as i16 + dx as i16 * steps as i16;
                let ty = from.y as i16 + dy as i16 * steps as i16;
                write!(f, "MOVE {} from {} to ({}, {}).", pieces, from, tx, ty)
            }
            Action::Boom { at } => write!(f, "BOOM at {}.", at),
        }
    }
}

/// A board setup that violates the state invariants.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("square ({x}, {y}) is off the board")]
    OutOfBounds { x: u8, y: u8 },
    #[error("stack at {pos} has non-positive height {count}")]
    BadCount { pos: Pos, count: u8 },
    #[error("square {pos} listed more than once")]
    DuplicateSquare { pos: Pos },
}

/// An action whose preconditions do not hold on the board it was applied to.
///
/// The action generator never produces such actions; these guard direct use
/// of the apply methods.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("no stack of the moving side at {at}")]
    NotOwnStack { at: Pos },
    #[error("cannot detach {requested} pieces from the {have}-stack at {at}")]
    StackTooSmall { at: Pos, have: u8, requested: u8 },
    #[error("move of zero pieces or zero steps from {at}")]
    DegenerateMove { at: Pos },
    #[error("move from {from} leaves the board")]
    OffBoard { from: Pos },
    #[error("destination {at} is enemy-occupied")]
    Blocked { at: Pos },
    #[error("boom origin {at} is unoccupied")]
    EmptySquare { at: Pos },
}

/// Full game state: one stack map per side.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct Board {
    white: BTreeMap<Pos, u8>,
    black: BTreeMap<Pos, u8>,
}

impl Board {
    /// Build a board from per-side `(count, x, y)` triples, validating the
    /// state invariants: in-range coordinates, heights >= 1, no square used
    /// twice within or across the two colors.
    pub fn from_stacks(white: &[(u8, u8, u8)], black: &[(u8, u8, u8)]) -> Result<Board, BoardError> {
        let mut board = Board::default();
        for (side, triples) in [(Side::White, white), (Side::Black, black)] {
            for &(count, x, y) in triples {
                let pos = Pos::checked(x, y).ok_or(BoardError::OutOfBounds { x, y })?;
                if count == 0 {
                    return Err(BoardError::BadCount { pos, count });
                }
                if board.occupant(pos).is_some() {
                    return Err(BoardError::DuplicateSquare { pos });
                }
                board.stacks_mut(side).insert(pos, count);
            }
        }
        Ok(board)
    }

    /// The stack map for one side.
    #[inline]
    pub fn stacks(&self, side: Side) -> &BTreeMap<Pos, u8> {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    #[inline]
    fn stacks_mut(&mut self, side: Side) -> &mut BTreeMap<Pos, u8> {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    /// Total piece count for one side.
    pub fn total(&self, side: Side) -> u32 {
        self.stacks(side).values().map(|&n| n as u32).sum()
    }

    /// Who occupies `pos`, and with how many pieces.
    pub fn occupant(&self, pos: Pos) -> Option<(Side, u8)> {
        if let Some(&n) = self.white.get(&pos) {
            Some((Side::White, n))
        } else {
            self.black.get(&pos).map(|&n| (Side::Black, n))
        }
    }

    /// Check if any stack of either color sits on `pos`.
    #[inline]
    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.white.contains_key(&pos) || self.black.contains_key(&pos)
    }

    /// Apply one action for `side`, returning the resulting board. The
    /// receiver is never mutated.
    pub fn apply(&self, side: Side, action: Action) -> Result<Board, ActionError> {
        match action {
            Action::Move {
                from,
                pieces,
                direction,
                steps,
            } => self.apply_move(side, from, pieces, direction, steps),
            Action::Boom { at } => self.apply_boom(at),
        }
    }

    /// Detach `pieces` from the stack at `from` and slide them `steps`
    /// squares in `direction`. Merges onto an own stack at the destination.
    pub fn apply_move(
        &self,
        side: Side,
        from: Pos,
        pieces: u8,
        direction: Direction,
        steps: u8,
    ) -> Result<Board, ActionError> {
        let have = *self
            .stacks(side)
            .get(&from)
            .ok_or(ActionError::NotOwnStack { at: from })?;
        if pieces == 0 || steps == 0 {
            return Err(ActionError::DegenerateMove { at: from });
        }
        if pieces > have {
            return Err(ActionError::StackTooSmall {
                at: from,
                have,
                requested: pieces,
            });
        }
        let dest = from
            .offset(direction, steps)
            .ok_or(ActionError::OffBoard { from })?;
        if self.stacks(side.opponent()).contains_key(&dest) {
            return Err(ActionError::Blocked { at: dest });
        }

        let mut next = self.clone();
        let stacks = next.stacks_mut(side);
        if have == pieces {
            stacks.remove(&from);
        } else {
            stacks.insert(from, have - pieces);
        }
        *stacks.entry(dest).or_insert(0) += pieces;
        Ok(next)
    }

    /// Detonate the stack at `at`, removing the entire blast cluster from
    /// both colors.
    pub fn apply_boom(&self, at: Pos) -> Result<Board, ActionError> {
        let cluster = self.blast_cluster(at)?;
        let mut next = self.clone();
        for pos in &cluster {
            next.white.remove(pos);
            next.black.remove(pos);
        }
        Ok(next)
    }

    /// The connected component of occupied squares under King adjacency that
    /// contains `at`: the set of squares a boom at `at` clears.
    ///
    /// Iterative worklist over occupied squares only; each occupied square
    /// is visited at most once, so this terminates in at most `|occupied|`
    /// steps regardless of cluster shape.
    pub fn blast_cluster(&self, at: Pos) -> Result<BTreeSet<Pos>, ActionError> {
        if !self.is_occupied(at) {
            return Err(ActionError::EmptySquare { at });
        }
        let mut cluster = BTreeSet::new();
        cluster.insert(at);
        let mut worklist = VecDeque::from([at]);
        while let Some(pos) = worklist.pop_front() {
            for neighbor in pos.king_neighbors() {
                if self.is_occupied(neighbor) && cluster.insert(neighbor) {
                    worklist.push_back(neighbor);
                }
            }
        }
        Ok(cluster)
    }
}
