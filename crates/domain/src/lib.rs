//! Domain layer for the event-sourcing runtime.
//!
//! This crate provides:
//! - the [`Rules`] oracle contract the runtime uses to validate and apply
//!   commands without knowing the game
//! - the replay engine ([`replay`], [`step`]) that folds an aggregate stream
//!   into an [`AggregateState`], optionally up to a [`Cutoff`]
//! - [`TicTacToe`], the rules shipped with the runtime

pub mod error;
pub mod replay;
pub mod rules;
pub mod tictactoe;

pub use error::{Result, RulesError};
pub use replay::{AggregateState, Cutoff, current, replay, step, stream};
pub use rules::{GameStatus, Rules};
pub use tictactoe::{Board, Cell, Mark, Move, TicTacToe};
