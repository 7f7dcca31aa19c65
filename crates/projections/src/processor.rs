//! Projection processor for feeding events to projections.

use event_store::{Event, EventStore};

use crate::Result;
use crate::projection::Projection;

/// Feeds log snapshots from an event store to projections.
///
/// The processor supports:
/// - Catch-up: reads a snapshot and delivers every event a projection has not
///   seen yet
/// - Single event delivery: delivers one event to all projections
/// - Rebuild: resets all projections and replays from scratch
pub struct ProjectionProcessor {
    store: EventStore,
    projections: Vec<Box<dyn Projection>>,
}

impl ProjectionProcessor {
    /// Creates a new processor reading from the given event store.
    pub fn new(store: EventStore) -> Self {
        Self {
            store,
            projections: Vec::new(),
        }
    }

    /// Registers a projection with this processor.
    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Takes a snapshot of the log and catches every projection up with it.
    ///
    /// Returns the number of events in the snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<usize> {
        let events = self.store.events().await?;
        self.catch_up_with(&events)?;
        Ok(events.len())
    }

    /// Delivers the events of `events` each projection has not processed yet.
    pub fn catch_up_with(&self, events: &[Event]) -> Result<()> {
        let mut delivered: u64 = 0;
        for projection in &self.projections {
            let position = projection.position();
            for event in events.iter().filter(|e| position.is_behind(e.id)) {
                projection.handle(event)?;
                delivered += 1;
            }
        }
        metrics::counter!("projections_events_processed").increment(delivered);
        tracing::debug!(
            snapshot_len = events.len(),
            delivered,
            "catch-up complete"
        );
        Ok(())
    }

    /// Delivers a single event to all registered projections.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub fn process_event(&self, event: &Event) -> Result<()> {
        for projection in &self.projections {
            projection.handle(event)?;
        }
        Ok(())
    }

    /// Resets all projections and replays a fresh snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<usize> {
        for projection in &self.projections {
            projection.reset();
        }
        self.run_catch_up().await
    }
}
