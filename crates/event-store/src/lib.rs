//! In-memory event log with a single-writer dispatcher.
//!
//! This crate provides the write side of the runtime:
//! - [`EventStore`], a cloneable handle for committing events, managing
//!   handlers and taking log snapshots
//! - the dispatcher task that owns the log and the [`HandlerRegistry`]
//! - the [`EventHandler`] contract for reactive subscribers
//! - [`EventQuery`] for filtering snapshots

mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod query;
pub mod registry;
mod store;

pub use common::AggregateId;
pub use dispatcher::StoreContext;
pub use error::{EventStoreError, HandlerError, Result};
pub use event::{Event, EventId, EventType, NewEvent};
pub use handler::{EventHandler, FnHandler, HandlerToken, handler_fn};
pub use query::EventQuery;
pub use registry::HandlerRegistry;
pub use store::EventStore;
