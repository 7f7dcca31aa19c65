//! Replay of aggregate streams into game state.
//!
//! Replay is a pure fold: it reads a log snapshot, never writes to the store
//! and keeps no cache, so the same snapshot, aggregate and cutoff always give
//! the same state.

use common::AggregateId;
use event_store::{Event, EventId, EventType};

use crate::rules::Rules;

/// Where a replay stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cutoff {
    /// Fold the whole stream.
    #[default]
    Latest,

    /// Stop right after the event with this id, if it is part of the stream.
    /// If it is not, the whole stream is folded.
    At(EventId),
}

impl Cutoff {
    fn reached_by(&self, id: EventId) -> bool {
        matches!(self, Cutoff::At(cutoff) if *cutoff == id)
    }
}

impl From<Option<EventId>> for Cutoff {
    fn from(id: Option<EventId>) -> Self {
        id.map_or(Cutoff::Latest, Cutoff::At)
    }
}

/// The result of a replay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AggregateState<S> {
    /// No creation event has been folded: the game does not exist (yet).
    #[default]
    Uninitialized,

    /// The game exists and is in this state.
    Initialized(S),
}

impl<S> AggregateState<S> {
    pub fn is_initialized(&self) -> bool {
        matches!(self, AggregateState::Initialized(_))
    }

    /// Returns the state, if the game exists.
    pub fn as_ref(&self) -> Option<&S> {
        match self {
            AggregateState::Initialized(state) => Some(state),
            AggregateState::Uninitialized => None,
        }
    }

    /// Converts into an `Option`, dropping the distinction's name.
    pub fn into_option(self) -> Option<S> {
        match self {
            AggregateState::Initialized(state) => Some(state),
            AggregateState::Uninitialized => None,
        }
    }
}

/// Returns the events of one aggregate stream, in id order.
pub fn stream<'a>(
    events: &'a [Event],
    aggregate_id: &'a AggregateId,
) -> impl Iterator<Item = &'a Event> + 'a {
    events.iter().filter(move |e| e.belongs_to(aggregate_id))
}

/// Folds one event into a state.
///
/// - `GameCreated` starts (or restarts) the game from the initial state.
/// - `MoveSucceeded` applies the move in its payload. A payload the rules
///   reject leaves the state unchanged; a move for a game that was never
///   created is ignored.
/// - Every other event type leaves the state unchanged.
pub fn step<R: Rules>(
    rules: &R,
    state: AggregateState<R::State>,
    event: &Event,
) -> AggregateState<R::State> {
    match event.event_type {
        EventType::GameCreated => AggregateState::Initialized(rules.initial()),
        EventType::MoveSucceeded => match state {
            AggregateState::Initialized(current) => {
                match rules
                    .parse_command(&event.data)
                    .and_then(|command| rules.apply(&current, &command))
                {
                    Ok(next) => AggregateState::Initialized(next),
                    Err(error) => {
                        tracing::warn!(
                            event_id = %event.id,
                            aggregate_id = %event.aggregate_id,
                            %error,
                            "recorded move no longer applies; skipping"
                        );
                        AggregateState::Initialized(current)
                    }
                }
            }
            AggregateState::Uninitialized => {
                tracing::debug!(
                    event_id = %event.id,
                    aggregate_id = %event.aggregate_id,
                    "move recorded before game creation; skipping"
                );
                AggregateState::Uninitialized
            }
        },
        EventType::MoveRequested
        | EventType::MoveFailed
        | EventType::FirstPlayerWon
        | EventType::SecondPlayerWon
        | EventType::Draw => state,
    }
}

/// Rebuilds the state of `aggregate_id` from a log snapshot.
pub fn replay<R: Rules>(
    rules: &R,
    events: &[Event],
    aggregate_id: &AggregateId,
    cutoff: Cutoff,
) -> AggregateState<R::State> {
    let mut state = AggregateState::Uninitialized;
    for event in stream(events, aggregate_id) {
        state = step(rules, state, event);
        if cutoff.reached_by(event.id) {
            break;
        }
    }
    state
}

/// Rebuilds the current state of `aggregate_id`.
pub fn current<R: Rules>(
    rules: &R,
    events: &[Event],
    aggregate_id: &AggregateId,
) -> AggregateState<R::State> {
    replay(rules, events, aggregate_id, Cutoff::Latest)
}
