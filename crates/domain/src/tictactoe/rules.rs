//! The tic-tac-toe rules oracle.

use std::str::FromStr;

use crate::error::{Result, RulesError};
use crate::rules::{GameStatus, Rules};

use super::board::{Board, Cell, Mark};

/// A move: the player to move marks `cell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub cell: Cell,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cell)
    }
}

impl FromStr for Move {
    type Err = RulesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Move { cell: s.parse()? })
    }
}

/// Tic-tac-toe on a 3x3 board.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl Rules for TicTacToe {
    type State = Board;
    type Command = Move;

    fn initial(&self) -> Board {
        Board::new()
    }

    fn parse_command(&self, input: &str) -> Result<Move> {
        input.parse()
    }

    fn apply(&self, state: &Board, command: &Move) -> Result<Board> {
        if self.status(state).is_terminal() {
            return Err(RulesError::GameOver);
        }
        if let Some(mark) = state.get(command.cell) {
            return Err(RulesError::illegal(
                command,
                format!("{} is already taken by {mark}", command.cell),
            ));
        }

        let mut next = state.clone();
        next.place(command.cell);
        Ok(next)
    }

    fn status(&self, state: &Board) -> GameStatus {
        match state.winner() {
            Some(Mark::X) => GameStatus::FirstPlayerWins,
            Some(Mark::O) => GameStatus::SecondPlayerWins,
            None if state.is_full() => GameStatus::Draw,
            None => GameStatus::Ongoing,
        }
    }
}
