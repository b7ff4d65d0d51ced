//! Core game logic for the oxo server.
//!
//! Everything in this crate is pure and synchronous: the board, the
//! opponent's move-selection policies and the per-session state machine.
//! Connection handling, wire formats and the session registry live in
//! `oxo-net`.

pub mod board;
pub mod bot;
pub mod session;

pub use board::{BOARD_SIZE, Board, Coord, Mark};
pub use bot::Strategy;
pub use session::{BOT_MARK, GameSnapshot, GameStatus, HUMAN_MARK, Session};
