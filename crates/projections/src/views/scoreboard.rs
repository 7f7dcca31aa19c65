//! Scoreboard read model: games counted by final outcome.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::AggregateId;
use event_store::{Event, EventType};
use serde::Serialize;

use super::{read, write};
use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// Games counted by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub first_player_wins: usize,
    pub second_player_wins: usize,
    pub draws: usize,
    pub ongoing: usize,
}

impl Scores {
    /// Total number of games.
    pub fn total(&self) -> usize {
        self.first_player_wins + self.second_player_wins + self.draws + self.ongoing
    }
}

impl std::fmt::Display for Scores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X wins: {}, O wins: {}, draws: {}, ongoing: {}",
            self.first_player_wins, self.second_player_wins, self.draws, self.ongoing
        )
    }
}

struct ScoreboardState {
    /// Outcome fact per created game; `None` while the game is ongoing.
    games: HashMap<AggregateId, Option<EventType>>,
    position: ProjectionPosition,
}

/// Read model view counting games by outcome.
///
/// Only created games are counted. An outcome fact for a game that was never
/// created is ignored, and the first fact of a game wins until it is created
/// again.
#[derive(Clone)]
pub struct ScoreboardView {
    state: Arc<RwLock<ScoreboardState>>,
}

impl ScoreboardView {
    /// Creates a new empty scoreboard.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ScoreboardState {
                games: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Current counts.
    pub fn scores(&self) -> Scores {
        read(&self.state)
            .games
            .values()
            .fold(Scores::default(), |mut scores, outcome| {
                match outcome {
                    Some(EventType::FirstPlayerWon) => scores.first_player_wins += 1,
                    Some(EventType::SecondPlayerWon) => scores.second_player_wins += 1,
                    Some(_) => scores.draws += 1,
                    None => scores.ongoing += 1,
                }
                scores
            })
    }
}

impl Default for ScoreboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for ScoreboardView {
    fn name(&self) -> &'static str {
        "ScoreboardView"
    }

    fn handle(&self, event: &Event) -> Result<()> {
        let mut state = write(&self.state);
        match event.event_type {
            EventType::GameCreated => {
                state.games.insert(event.aggregate_id.clone(), None);
            }
            t if t.is_outcome() => {
                if let Some(outcome) = state.games.get_mut(&event.aggregate_id)
                    && outcome.is_none()
                {
                    *outcome = Some(t);
                }
            }
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

impl ReadModel for ScoreboardView {
    fn name(&self) -> &'static str {
        "ScoreboardView"
    }

    fn count(&self) -> usize {
        read(&self.state).games.len()
    }
}

#[cfg(test)]
mod tests {
    use event_store::EventId;

    use super::*;

    fn event(id: u64, game: &str, event_type: EventType) -> Event {
        Event {
            id: EventId::new(id),
            aggregate_id: AggregateId::new(game),
            event_type,
            data: String::new(),
        }
    }

    #[test]
    fn counts_games_by_outcome() {
        let view = ScoreboardView::new();
        let log = [
            event(0, "a", EventType::GameCreated),
            event(1, "b", EventType::GameCreated),
            event(2, "c", EventType::GameCreated),
            event(3, "d", EventType::GameCreated),
            event(4, "a", EventType::FirstPlayerWon),
            event(5, "b", EventType::SecondPlayerWon),
            event(6, "c", EventType::Draw),
        ];
        for e in &log {
            view.handle(e).unwrap();
        }

        let scores = view.scores();
        assert_eq!(
            scores,
            Scores {
                first_player_wins: 1,
                second_player_wins: 1,
                draws: 1,
                ongoing: 1,
            }
        );
        assert_eq!(scores.total(), 4);
        assert_eq!(
            scores.to_string(),
            "X wins: 1, O wins: 1, draws: 1, ongoing: 1"
        );
    }

    #[test]
    fn ignores_facts_for_unknown_games_and_duplicates() {
        let view = ScoreboardView::new();
        for e in [
            event(0, "ghost", EventType::Draw),
            event(1, "a", EventType::GameCreated),
            event(2, "a", EventType::FirstPlayerWon),
            event(3, "a", EventType::Draw),
        ] {
            view.handle(&e).unwrap();
        }

        let scores = view.scores();
        assert_eq!(scores.first_player_wins, 1);
        assert_eq!(scores.draws, 0);
        assert_eq!(ReadModel::count(&view), 1);
    }

    #[test]
    fn recreated_game_is_ongoing_again() {
        let view = ScoreboardView::new();
        for e in [
            event(0, "a", EventType::GameCreated),
            event(1, "a", EventType::Draw),
            event(2, "a", EventType::GameCreated),
        ] {
            view.handle(&e).unwrap();
        }
        assert_eq!(view.scores().ongoing, 1);
        assert_eq!(view.scores().draws, 0);
    }

    #[test]
    fn scores_serialize_as_object() {
        let json = serde_json::to_value(Scores::default()).unwrap();
        assert_eq!(json["first_player_wins"], 0);
        assert_eq!(json["ongoing"], 0);
    }
}
