//! Move selection for the built-in opponent.
//!
//! Policies form a closed set: clients pick one by string identifier when a
//! game starts, and unrecognized identifiers silently fall back to the
//! rule-based policy rather than failing the request.

use rand::Rng;

use crate::board::{Board, Coord, Mark};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// A move-selection policy, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Tiered heuristic: win, block, center, corner, first empty.
    #[default]
    RuleBased,
    /// Uniformly random choice among the empty cells.
    Random,
}

impl Strategy {
    /// Parse a client-supplied identifier. `"random"` selects
    /// [`Strategy::Random`]; `"rule-based"` and every other string select
    /// [`Strategy::RuleBased`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "random" => Strategy::Random,
            _ => Strategy::RuleBased,
        }
    }

    /// Canonical identifier for this policy.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::RuleBased => "rule-based",
            Strategy::Random => "random",
        }
    }

    /// Pick the next cell for `mark`. Returns `None` only when the board has
    /// no empty cell.
    pub fn choose(self, board: &Board, mark: Mark) -> Option<Coord> {
        match self {
            Strategy::RuleBased => rule_based_move(board, mark),
            Strategy::Random => random_move(board),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule-based tiers
// ---------------------------------------------------------------------------

const CENTER: Coord = Coord::new(1, 1);

/// Corner preference: top-left, top-right, bottom-left, bottom-right.
const CORNERS: [Coord; 4] = [
    Coord::new(0, 0),
    Coord::new(0, 2),
    Coord::new(2, 0),
    Coord::new(2, 2),
];

/// The tiered heuristic. Tiers are tried in strict order and the first one
/// that yields a cell wins; the ordering is the policy's contract.
fn rule_based_move(board: &Board, mark: Mark) -> Option<Coord> {
    // Complete our own line.
    if let Some(at) = completing_move(board, mark) {
        return Some(at);
    }
    // Deny the opponent theirs.
    if let Some(at) = completing_move(board, mark.opponent()) {
        return Some(at);
    }
    if board.is_empty(CENTER) {
        return Some(CENTER);
    }
    for at in CORNERS {
        if board.is_empty(at) {
            return Some(at);
        }
    }
    // Whatever is left, row-major.
    board.empty_cells().into_iter().next()
}

/// The first empty cell, in row-major order, where placing `mark` completes
/// a line.
fn completing_move(board: &Board, mark: Mark) -> Option<Coord> {
    for at in board.empty_cells() {
        let mut probe = *board;
        probe.place(at, mark);
        if probe.winner() == Some(mark) {
            return Some(at);
        }
    }
    None
}

/// A uniformly random empty cell.
fn random_move(board: &Board) -> Option<Coord> {
    let empties = board.empty_cells();
    if empties.is_empty() {
        return None;
    }
    let mut rng = rand::rng();
    Some(empties[rng.random_range(0..empties.len())])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
