use crate::{AggregateId, Event, EventId, EventType};

/// Builder for filtering a log snapshot.
///
/// Allows filtering events by aggregate, event type and id range, with
/// optional paging.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Filter by aggregate ID.
    pub aggregate_id: Option<AggregateId>,

    /// Filter by event types (any of these types).
    pub event_types: Option<Vec<EventType>>,

    /// Filter by minimum event id (inclusive).
    pub from_id: Option<EventId>,

    /// Filter by maximum event id (inclusive).
    pub to_id: Option<EventId>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,

    /// Number of events to skip.
    pub offset: Option<usize>,
}

impl EventQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a specific aggregate.
    pub fn for_aggregate(aggregate_id: impl Into<AggregateId>) -> Self {
        Self {
            aggregate_id: Some(aggregate_id.into()),
            ..Default::default()
        }
    }

    /// Creates a query for events of a specific type.
    pub fn for_event_type(event_type: EventType) -> Self {
        Self {
            event_types: Some(vec![event_type]),
            ..Default::default()
        }
    }

    /// Filters by aggregate ID.
    pub fn aggregate_id(mut self, id: impl Into<AggregateId>) -> Self {
        self.aggregate_id = Some(id.into());
        self
    }

    /// Filters by event type.
    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_types = Some(vec![event_type]);
        self
    }

    /// Filters by multiple event types (any of these).
    pub fn event_types(mut self, event_types: Vec<EventType>) -> Self {
        self.event_types = Some(event_types);
        self
    }

    /// Filters to events starting from this id (inclusive).
    pub fn from_id(mut self, id: EventId) -> Self {
        self.from_id = Some(id);
        self
    }

    /// Filters to events up to this id (inclusive).
    pub fn to_id(mut self, id: EventId) -> Self {
        self.to_id = Some(id);
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first N results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if `event` passes every filter of the query.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref id) = self.aggregate_id
            && &event.aggregate_id != id
        {
            return false;
        }
        if let Some(ref types) = self.event_types
            && !types.contains(&event.event_type)
        {
            return false;
        }
        if let Some(from) = self.from_id
            && event.id < from
        {
            return false;
        }
        if let Some(to) = self.to_id
            && event.id > to
        {
            return false;
        }
        true
    }

    /// Filters `events`, keeping log order, then applies offset and limit.
    pub fn apply(&self, events: impl IntoIterator<Item = Event>) -> Vec<Event> {
        events
            .into_iter()
            .filter(|e| self.matches(e))
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}
