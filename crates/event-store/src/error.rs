use thiserror::Error;

/// Errors that can occur when talking to the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The dispatcher has shut down and no longer accepts requests.
    #[error("Dispatcher is closed")]
    DispatcherClosed,

    /// The dispatcher stopped before answering a snapshot request.
    #[error("Dispatcher dropped the reply to a {0} request")]
    ReplyDropped(&'static str),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;

/// A fault reported by an event handler.
///
/// The dispatcher logs handler faults and carries on with the remaining
/// handlers; they never reach the caller that committed the event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler could not submit a follow-up request.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The handler could not forward a signal to its sink.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    pub fn other(message: impl Into<String>) -> Self {
        HandlerError::Other(message.into())
    }
}
