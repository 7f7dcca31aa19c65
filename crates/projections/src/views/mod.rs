//! Read model views over the game log.

pub mod game_history;
pub mod scoreboard;

pub use game_history::{GameHistory, GameHistoryView};
pub use scoreboard::{Scores, ScoreboardView};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panicking reader cannot leave a view half-updated, so poisoning is ignored.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
