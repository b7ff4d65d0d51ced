//! One game's lifecycle as a pure state machine.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord, Mark};
use crate::bot::Strategy;

/// The human player's mark. The human always moves first.
pub const HUMAN_MARK: Mark = Mark::X;

/// The built-in opponent's mark.
pub const BOT_MARK: Mark = Mark::O;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle phase of a session. `Won` and `Draw` are terminal: no
/// transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Moves are being accepted.
    Playing,
    /// A line was completed.
    Won,
    /// The board filled without a winner.
    Draw,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The complete state of one game between a human and the built-in opponent.
///
/// A session is a plain value: [`Session::advance`] returns the successor
/// state instead of mutating in place, so a request is applied in full or
/// not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    board: Board,
    current_player: Mark,
    strategy: Strategy,
    status: GameStatus,
    winner: Option<Mark>,
}

impl Session {
    /// A fresh game: empty board, human to move.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            board: Board::new(),
            current_player: HUMAN_MARK,
            strategy,
            status: GameStatus::Playing,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    /// Apply the human's move at `at` and, while the game continues, the
    /// opponent's reply. Returns the successor state, or `None` when the
    /// request must be ignored because the session is already terminal or
    /// the cell is occupied. An ignored request leaves no trace and callers
    /// emit nothing for it.
    ///
    /// The successor is computed in full before it is returned; no observer
    /// can see the human's move without the opponent's reply.
    pub fn advance(&self, at: Coord) -> Option<Session> {
        if self.status != GameStatus::Playing || !self.board.is_empty(at) {
            return None;
        }

        let mut next = self.clone();
        next.board.place(at, next.current_player);
        if next.settle() {
            return Some(next);
        }

        next.current_player = BOT_MARK;
        if let Some(reply) = next.strategy.choose(&next.board, BOT_MARK) {
            next.board.place(reply, BOT_MARK);
            next.settle();
        }
        // Every published snapshot reports the human as the player to move,
        // terminal or not.
        next.current_player = HUMAN_MARK;
        Some(next)
    }

    /// Record a terminal outcome if the board has one. Returns `true` when
    /// the session just became terminal.
    fn settle(&mut self) -> bool {
        if let Some(mark) = self.board.winner() {
            self.status = GameStatus::Won;
            self.winner = Some(mark);
            true
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
            true
        } else {
            false
        }
    }

    /// The externally observable view of this session.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            current_player: self.current_player,
            status: self.status,
            winner: self.winner,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The serialized view of a session, pushed to its client after every
/// accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Cell grid, row-major, `null` for empty cells.
    pub board: Board,
    /// The player expected to move next; see [`Session::advance`].
    pub current_player: Mark,
    pub status: GameStatus,
    /// Present only when `status` is [`GameStatus::Won`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Mark>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
