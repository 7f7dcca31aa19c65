//! Reactive handlers for the game runtime.
//!
//! Three handler shapes react to committed events:
//! - [`MoveHandler`] turns each `MoveRequested` into exactly one
//!   `MoveSucceeded` or `MoveFailed`
//! - [`StatusChangeHandler`] records a single outcome fact once a game ends
//! - [`GameObserver`] forwards accept/reject [`Signal`]s for one game to a
//!   watcher and deregisters itself when the watcher goes away
//!
//! Handlers only ever read the log through their [`StoreContext`] and submit
//! new events as queued requests, so none of them blocks the dispatcher.
//!
//! [`StoreContext`]: event_store::StoreContext

mod command;
mod observer;
mod status;

use std::sync::Arc;

use domain::Rules;
use event_store::{EventStore, HandlerToken};

pub use command::{GAME_NOT_FOUND, MoveHandler, decide_move};
pub use observer::{GameObserver, Signal};
pub use status::{StatusChangeHandler, outcome_event_type, outcome_recorded};

/// Tokens of the handlers installed by [`register_game_handlers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameHandlers {
    pub moves: HandlerToken,
    pub status: HandlerToken,
}

/// Registers the move handler followed by the status handler.
///
/// The order matters only for readability of the log: a success is always
/// committed before the fact derived from it, whatever the order.
pub fn register_game_handlers<R: Rules>(
    store: &EventStore,
    rules: Arc<R>,
) -> event_store::Result<GameHandlers> {
    let moves = store.register(MoveHandler::new(Arc::clone(&rules)))?;
    let status = store.register(StatusChangeHandler::new(rules))?;
    tracing::debug!(%moves, %status, "game handlers registered");
    Ok(GameHandlers { moves, status })
}
