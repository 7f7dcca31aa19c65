//! Observer handler: forwards move results of one game to a watcher.

use common::AggregateId;
use event_store::{
    Event, EventHandler, EventStore, EventType, HandlerError, HandlerToken, StoreContext,
};
use tokio::sync::mpsc;

/// What a watcher is told about a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Accepted,
    Rejected,
}

impl Signal {
    /// Returns the wire form of the signal: `"1"` or `"0"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Accepted => "1",
            Signal::Rejected => "0",
        }
    }

    fn for_event(event_type: EventType) -> Option<Self> {
        match event_type {
            EventType::MoveSucceeded => Some(Signal::Accepted),
            EventType::MoveFailed => Some(Signal::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends a [`Signal`] for every success or failure event of one game.
///
/// Events of other games and other event types are ignored. Once the
/// receiving side is gone the observer deregisters itself and stays silent.
pub struct GameObserver {
    token: HandlerToken,
    aggregate_id: AggregateId,
    sink: mpsc::UnboundedSender<Signal>,
    detached: bool,
}

impl GameObserver {
    pub fn new(
        token: HandlerToken,
        aggregate_id: AggregateId,
        sink: mpsc::UnboundedSender<Signal>,
    ) -> Self {
        Self {
            token,
            aggregate_id,
            sink,
            detached: false,
        }
    }

    /// Registers an observer for `aggregate_id` and returns its token and the
    /// receiving end of its signals.
    pub fn watch(
        store: &EventStore,
        aggregate_id: AggregateId,
    ) -> event_store::Result<(HandlerToken, mpsc::UnboundedReceiver<Signal>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = store.register_with(|token| GameObserver::new(token, aggregate_id, tx))?;
        Ok((token, rx))
    }
}

impl EventHandler for GameObserver {
    fn name(&self) -> &str {
        "game_observer"
    }

    fn handle(&mut self, ctx: &StoreContext<'_>, event: &Event) -> Result<(), HandlerError> {
        if self.detached || !event.belongs_to(&self.aggregate_id) {
            return Ok(());
        }
        let Some(signal) = Signal::for_event(event.event_type) else {
            return Ok(());
        };

        if self.sink.send(signal).is_err() {
            tracing::debug!(
                token = %self.token,
                aggregate_id = %self.aggregate_id,
                "watcher disconnected; deregistering"
            );
            self.detached = true;
            ctx.deregister(self.token)?;
        }
        Ok(())
    }
}
