//! Application error types.

use common::AggregateId;
use thiserror::Error;

/// Errors surfaced by [`App`](crate::App) and the driver.
#[derive(Debug, Error)]
pub enum AppError {
    /// The dispatcher has stopped or dropped a reply.
    #[error(transparent)]
    EventStore(#[from] event_store::EventStoreError),

    /// A read model could not be brought up to date.
    #[error(transparent)]
    Projection(#[from] projections::ProjectionError),

    /// The game has no creation event.
    #[error("game {0} not found")]
    GameNotFound(AggregateId),

    /// A driver line could not be understood.
    #[error("{0}")]
    Usage(String),

    /// The dispatcher task failed to finish.
    #[error("dispatcher task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
