//! Core projection trait and position tracking.

use event_store::{Event, EventId};

use crate::Result;

/// Tracks how many events a projection has processed.
///
/// Event ids are gap-free and start at zero, so the position is also the id
/// of the next event the projection expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    /// Number of events processed by this projection.
    pub events_processed: u64,
}

impl ProjectionPosition {
    /// Creates a new position at zero.
    pub fn zero() -> Self {
        Self {
            events_processed: 0,
        }
    }

    /// Advances the position by one event.
    pub fn advance(&self) -> Self {
        Self {
            events_processed: self.events_processed + 1,
        }
    }

    /// Returns true if the event has not been processed yet.
    pub fn is_behind(&self, id: EventId) -> bool {
        id.as_u64() >= self.events_processed
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.events_processed)
    }
}

/// A projection that processes events and updates a read model.
///
/// Projections only read committed events; they never write to the store.
/// Implementations share their state with the handles used for queries, so
/// `handle` takes `&self`.
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the projection's read model.
    fn handle(&self, event: &Event) -> Result<()>;

    /// Returns the current position of this projection.
    fn position(&self) -> ProjectionPosition;

    /// Resets the projection to its initial state.
    fn reset(&self);
}
