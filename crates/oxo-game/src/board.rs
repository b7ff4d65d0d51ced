//! The 3x3 board: cell storage, line scanning and fullness queries.
//!
//! [`Board`] is a small `Copy` value, so callers probe hypothetical
//! placements on a stack copy instead of mutating and undoing.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// One player's symbol. The human plays [`Mark::X`] and always moves first;
/// the built-in opponent plays [`Mark::O`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other player's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Side length of the (always square) board.
pub const BOARD_SIZE: usize = 3;

/// A cell position, in bounds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Build a coordinate known to be in bounds. Out-of-range indices are a
    /// caller bug; untrusted input goes through [`Coord::from_signed`].
    pub const fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < BOARD_SIZE && col < BOARD_SIZE);
        Self { row, col }
    }

    /// Validate possibly out-of-range indices, e.g. straight off the wire.
    /// Returns `None` for anything outside the grid.
    pub fn from_signed(row: i32, col: i32) -> Option<Self> {
        let size = BOARD_SIZE as i32;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Self {
                row: row as usize,
                col: col as usize,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The eight winning lines: three rows, three columns, two diagonals.
///
/// The order is part of the contract: [`Board::winner`] reports the first
/// complete line in this order.
const LINES: [[Coord; BOARD_SIZE]; 8] = [
    [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)],
    [Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2)],
    [Coord::new(2, 0), Coord::new(2, 1), Coord::new(2, 2)],
    [Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)],
    [Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)],
    [Coord::new(0, 2), Coord::new(1, 2), Coord::new(2, 2)],
    [Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 2)],
    [Coord::new(0, 2), Coord::new(1, 1), Coord::new(2, 0)],
];

/// A 3x3 grid of optionally marked cells.
///
/// Serializes transparently as a 3x3 array of `"X" | "O" | null`, the shape
/// clients receive in every state push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mark at `at`, if any.
    pub fn get(&self, at: Coord) -> Option<Mark> {
        self.cells[at.row][at.col]
    }

    /// `true` if the cell at `at` is unoccupied.
    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at).is_none()
    }

    /// Place `mark` at `at`. The cell must be empty; placing onto an
    /// occupied cell is a logic error in the caller, not a recoverable
    /// condition here.
    pub fn place(&mut self, at: Coord, mark: Mark) {
        debug_assert!(self.is_empty(at), "cell {at} is already occupied");
        self.cells[at.row][at.col] = Some(mark);
    }

    /// The winning mark, if any line is complete.
    ///
    /// A board with several complete lines (unreachable under alternating
    /// play) yields the first in scan order rather than failing.
    pub fn winner(&self) -> Option<Mark> {
        for line in &LINES {
            if let Some(mark) = self.get(line[0])
                && self.get(line[1]) == Some(mark)
                && self.get(line[2]) == Some(mark)
            {
                return Some(mark);
            }
        }
        None
    }

    /// `true` when every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| cell.is_some())
    }

    /// `true` when no further move is possible: a line is complete or the
    /// board is full.
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// All empty cells, in row-major order.
    pub fn empty_cells(&self) -> Vec<Coord> {
        let mut cells = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let at = Coord::new(row, col);
                if self.is_empty(at) {
                    cells.push(at);
                }
            }
        }
        cells
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
