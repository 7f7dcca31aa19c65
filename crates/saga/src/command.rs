//! Command handler: turns move requests into success or failure events.

use std::sync::Arc;

use common::AggregateId;
use domain::{AggregateState, Rules, current};
use event_store::{Event, EventHandler, EventType, HandlerError, NewEvent, StoreContext};

/// Payload of the failure event for a request against a game that does not
/// exist.
pub const GAME_NOT_FOUND: &str = "game not found";

/// Validates `MoveRequested` events against the rules.
///
/// For every request it replays the game, asks the rules to parse and apply
/// the move, and commits exactly one `MoveSucceeded` (payload: the move as
/// requested) or `MoveFailed` (payload: the reason) on the same game. Other
/// event types are ignored.
pub struct MoveHandler<R: Rules> {
    rules: Arc<R>,
}

impl<R: Rules> MoveHandler<R> {
    pub fn new(rules: Arc<R>) -> Self {
        Self { rules }
    }
}

/// Decides the outcome of a move request against `state`.
pub fn decide_move<R: Rules>(
    rules: &R,
    aggregate_id: &AggregateId,
    state: &AggregateState<R::State>,
    request: &str,
) -> NewEvent {
    let Some(state) = state.as_ref() else {
        return NewEvent::new(aggregate_id.clone(), EventType::MoveFailed, GAME_NOT_FOUND);
    };

    match rules
        .parse_command(request)
        .and_then(|command| rules.apply(state, &command))
    {
        Ok(_) => NewEvent::new(aggregate_id.clone(), EventType::MoveSucceeded, request),
        Err(error) => NewEvent::new(
            aggregate_id.clone(),
            EventType::MoveFailed,
            error.to_string(),
        ),
    }
}

impl<R: Rules> EventHandler for MoveHandler<R> {
    fn name(&self) -> &str {
        "move_handler"
    }

    fn handle(&mut self, ctx: &StoreContext<'_>, event: &Event) -> Result<(), HandlerError> {
        if event.event_type != EventType::MoveRequested {
            return Ok(());
        }

        let state = current(self.rules.as_ref(), ctx.events(), &event.aggregate_id);
        let decision = decide_move(self.rules.as_ref(), &event.aggregate_id, &state, &event.data);

        let outcome = if decision.event_type == EventType::MoveSucceeded {
            "accepted"
        } else {
            "rejected"
        };
        metrics::counter!("saga_commands_total", "outcome" => outcome).increment(1);
        tracing::debug!(
            event_id = %event.id,
            aggregate_id = %event.aggregate_id,
            request = %event.data,
            outcome,
            "move request decided"
        );

        ctx.commit(decision)?;
        Ok(())
    }
}
