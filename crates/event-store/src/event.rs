use serde::{Deserialize, Serialize};

use crate::AggregateId;

/// Position of an event in the log.
///
/// Ids are assigned by the dispatcher at commit time: the first event gets 0
/// and every following event gets the previous id plus one, so the ids in a
/// log are always `0..len` with no gaps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Creates an event id from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the id of the first event in a log.
    pub fn first() -> Self {
        Self(0)
    }

    /// Returns the id that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<EventId> for u64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// The closed set of event types known to the runtime.
///
/// Request events are submitted by clients, the success/fail pair is derived
/// by the move handler, and the three outcome facts are derived by the status
/// handler once a game has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    GameCreated,
    MoveRequested,
    MoveSucceeded,
    MoveFailed,
    FirstPlayerWon,
    SecondPlayerWon,
    Draw,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 7] = [
        EventType::GameCreated,
        EventType::MoveRequested,
        EventType::MoveSucceeded,
        EventType::MoveFailed,
        EventType::FirstPlayerWon,
        EventType::SecondPlayerWon,
        EventType::Draw,
    ];

    /// Returns the wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::GameCreated => "game_created",
            EventType::MoveRequested => "move_requested",
            EventType::MoveSucceeded => "move_succeeded",
            EventType::MoveFailed => "move_failed",
            EventType::FirstPlayerWon => "first_player_won",
            EventType::SecondPlayerWon => "second_player_won",
            EventType::Draw => "draw",
        }
    }

    /// Returns true for the facts recorded when a game ends.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            EventType::FirstPlayerWon | EventType::SecondPlayerWon | EventType::Draw
        )
    }

    /// Returns true for the events a move handler derives from a request.
    pub fn is_move_result(&self) -> bool {
        matches!(self, EventType::MoveSucceeded | EventType::MoveFailed)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed event.
///
/// Events are only ever created by the dispatcher, which assigns the id at the
/// same moment it appends the event to the log. Once committed an event is
/// never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position of the event in the log.
    pub id: EventId,

    /// The aggregate stream this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of the event.
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Opaque payload. Its meaning depends on `event_type`.
    pub data: String,
}

impl Event {
    /// Returns true if the event belongs to the given aggregate.
    pub fn belongs_to(&self, aggregate_id: &AggregateId) -> bool {
        &self.aggregate_id == aggregate_id
    }
}

/// A candidate event submitted for commit. It has no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub aggregate_id: AggregateId,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub data: String,
}

impl NewEvent {
    pub fn new(
        aggregate_id: impl Into<AggregateId>,
        event_type: EventType,
        data: impl Into<String>,
    ) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            event_type,
            data: data.into(),
        }
    }

    /// Creates an event with an empty payload.
    pub fn bare(aggregate_id: impl Into<AggregateId>, event_type: EventType) -> Self {
        Self::new(aggregate_id, event_type, String::new())
    }

    /// Turns the candidate into a committed event with the given id.
    pub(crate) fn commit(self, id: EventId) -> Event {
        Event {
            id,
            aggregate_id: self.aggregate_id,
            event_type: self.event_type,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_ordering() {
        let first = EventId::first();
        assert_eq!(first.as_u64(), 0);
        assert_eq!(first.next(), EventId::new(1));
        assert!(first < first.next());
    }

    #[test]
    fn event_type_names_match_serde() {
        for event_type in EventType::ALL {
            let json = serde_json::to_string(&event_type).unwrap();
            assert_eq!(json, format!("\"{}\"", event_type.as_str()));
        }
    }

    #[test]
    fn outcome_types() {
        let outcomes: Vec<_> = EventType::ALL
            .into_iter()
            .filter(EventType::is_outcome)
            .collect();
        assert_eq!(
            outcomes,
            vec![
                EventType::FirstPlayerWon,
                EventType::SecondPlayerWon,
                EventType::Draw
            ]
        );
    }

    #[test]
    fn event_wire_shape() {
        let event = NewEvent::new("brave-otter", EventType::MoveRequested, "b2")
            .commit(EventId::new(4));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 4,
                "aggregate_id": "brave-otter",
                "type": "move_requested",
                "data": "b2",
            })
        );

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn bare_event_has_empty_payload() {
        let event = NewEvent::bare("brave-otter", EventType::GameCreated);
        assert!(event.data.is_empty());
        assert_eq!(event.aggregate_id, AggregateId::new("brave-otter"));
    }
}
