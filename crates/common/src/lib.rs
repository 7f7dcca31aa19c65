//! Shared types for the event-sourcing runtime.

mod types;

pub use types::{AggregateId, IdGenerator, UuidGenerator};
