//! Tic-tac-toe rules.
//!
//! Cells are addressed like a chess board: file `a`-`c` from left to right,
//! rank `1`-`3` from bottom to top. X always moves first.

mod board;
mod rules;

pub use board::{Board, Cell, Mark};
pub use rules::{Move, TicTacToe};
