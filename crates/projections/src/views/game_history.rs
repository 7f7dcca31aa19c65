//! Game history read model: the event ids and accepted moves of each game.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use common::AggregateId;
use event_store::{Event, EventId, EventType};
use serde::Serialize;

use super::{read, write};
use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// History of one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameHistory {
    /// Ids of every event in the game's stream, in log order. Clients use
    /// them as cutoffs for as-of replays.
    pub event_ids: Vec<EventId>,

    /// Payloads of the success events since the game was last created.
    pub moves: Vec<String>,

    /// The outcome fact, once one has been recorded.
    pub outcome: Option<EventType>,
}

struct GameHistoryState {
    games: BTreeMap<AggregateId, GameHistory>,
    position: ProjectionPosition,
}

/// Read model view of every game's stream.
///
/// Clones share the same state, so one clone can be registered with a
/// [`ProjectionProcessor`](crate::ProjectionProcessor) while another serves
/// queries.
#[derive(Clone)]
pub struct GameHistoryView {
    state: Arc<RwLock<GameHistoryState>>,
}

impl GameHistoryView {
    /// Creates a new empty history view.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(GameHistoryState {
                games: BTreeMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Gets the history of one game.
    pub fn get(&self, aggregate_id: &AggregateId) -> Option<GameHistory> {
        read(&self.state).games.get(aggregate_id).cloned()
    }

    /// Ids of the game's events. Empty for an unknown game.
    pub fn event_ids(&self, aggregate_id: &AggregateId) -> Vec<EventId> {
        read(&self.state)
            .games
            .get(aggregate_id)
            .map(|g| g.event_ids.clone())
            .unwrap_or_default()
    }

    /// Accepted moves of the game, in order. Empty for an unknown game.
    pub fn moves(&self, aggregate_id: &AggregateId) -> Vec<String> {
        read(&self.state)
            .games
            .get(aggregate_id)
            .map(|g| g.moves.clone())
            .unwrap_or_default()
    }

    /// Ids of every game that has at least one event, in id order.
    pub fn games(&self) -> Vec<AggregateId> {
        read(&self.state).games.keys().cloned().collect()
    }
}

impl Default for GameHistoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for GameHistoryView {
    fn name(&self) -> &'static str {
        "GameHistoryView"
    }

    fn handle(&self, event: &Event) -> Result<()> {
        let mut state = write(&self.state);
        let game = state.games.entry(event.aggregate_id.clone()).or_default();
        game.event_ids.push(event.id);

        match event.event_type {
            EventType::GameCreated => {
                game.moves.clear();
                game.outcome = None;
            }
            EventType::MoveSucceeded => game.moves.push(event.data.clone()),
            t if t.is_outcome() => game.outcome = Some(t),
            _ => {}
        }

        state.position = state.position.advance();
        Ok(())
    }

    fn position(&self) -> ProjectionPosition {
        read(&self.state).position
    }

    fn reset(&self) {
        let mut state = write(&self.state);
        state.games.clear();
        state.position = ProjectionPosition::zero();
    }
}

impl ReadModel for GameHistoryView {
    fn name(&self) -> &'static str {
        "GameHistoryView"
    }

    fn count(&self) -> usize {
        read(&self.state).games.len()
    }
}
