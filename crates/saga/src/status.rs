//! Derived-fact handler: records how a game ended.

use std::collections::HashSet;
use std::sync::Arc;

use common::AggregateId;
use domain::{GameStatus, Rules, current, stream};
use event_store::{Event, EventHandler, EventType, HandlerError, NewEvent, StoreContext};

/// Records an outcome fact once a successful move ends a game.
///
/// The handler reacts to `MoveSucceeded` only. After replaying the game it
/// commits `FirstPlayerWon`, `SecondPlayerWon` or `Draw` (payload: the move
/// that triggered it) if the game is over and no outcome fact has been
/// recorded for it yet.
///
/// Facts it has already committed may still be queued when the next success
/// for the same game arrives, so the handler also remembers which games it has
/// announced. An entry lives only until the fact itself (or a repeated
/// `GameCreated`) reaches the handler, so the set holds facts in flight.
pub struct StatusChangeHandler<R: Rules> {
    rules: Arc<R>,
    announced: HashSet<AggregateId>,
}

impl<R: Rules> StatusChangeHandler<R> {
    pub fn new(rules: Arc<R>) -> Self {
        Self {
            rules,
            announced: HashSet::new(),
        }
    }
}

/// Maps a terminal status to the fact recording it.
pub fn outcome_event_type(status: GameStatus) -> Option<EventType> {
    match status {
        GameStatus::Ongoing => None,
        GameStatus::FirstPlayerWins => Some(EventType::FirstPlayerWon),
        GameStatus::SecondPlayerWins => Some(EventType::SecondPlayerWon),
        GameStatus::Draw => Some(EventType::Draw),
    }
}

/// Returns true if the current incarnation of the game already has an outcome
/// fact in `events`.
pub fn outcome_recorded(events: &[Event], aggregate_id: &AggregateId) -> bool {
    stream(events, aggregate_id).fold(false, |recorded, event| match event.event_type {
        EventType::GameCreated => false,
        t if t.is_outcome() => true,
        _ => recorded,
    })
}

impl<R: Rules> EventHandler for StatusChangeHandler<R> {
    fn name(&self) -> &str {
        "status_change_handler"
    }

    fn handle(&mut self, ctx: &StoreContext<'_>, event: &Event) -> Result<(), HandlerError> {
        match event.event_type {
            EventType::GameCreated => {
                self.announced.remove(&event.aggregate_id);
                return Ok(());
            }
            t if t.is_outcome() => {
                // From here on the log itself records the outcome.
                self.announced.remove(&event.aggregate_id);
                return Ok(());
            }
            EventType::MoveSucceeded => {}
            _ => return Ok(()),
        }

        if self.announced.contains(&event.aggregate_id)
            || outcome_recorded(ctx.events(), &event.aggregate_id)
        {
            return Ok(());
        }

        let state = current(self.rules.as_ref(), ctx.events(), &event.aggregate_id);
        let Some(state) = state.into_option() else {
            return Ok(());
        };
        let status = self.rules.status(&state);
        let Some(fact) = outcome_event_type(status) else {
            return Ok(());
        };

        tracing::info!(
            event_id = %event.id,
            aggregate_id = %event.aggregate_id,
            %status,
            "game over"
        );
        ctx.commit(NewEvent::new(
            event.aggregate_id.clone(),
            fact,
            event.data.clone(),
        ))?;
        self.announced.insert(event.aggregate_id.clone());
        Ok(())
    }
}
