//! Event handler contract.

use serde::{Deserialize, Serialize};

use crate::Event;
use crate::dispatcher::StoreContext;
use crate::error::HandlerError;

/// Opaque identity of a registered handler, used to deregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerToken(u64);

impl HandlerToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandlerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// A subscriber invoked for every committed event.
///
/// Handlers run synchronously on the dispatcher task, one after another in
/// registration order. Anything a handler submits through the context is
/// queued and processed after every handler has seen the current event.
///
/// A handler that blocks stalls the whole store. Blocking work belongs on a
/// separate task.
pub trait EventHandler: Send + 'static {
    /// Name used when logging faults.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Reacts to a committed event.
    fn handle(&mut self, ctx: &StoreContext<'_>, event: &Event) -> Result<(), HandlerError>;
}

impl<H: EventHandler + ?Sized> EventHandler for Box<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn handle(&mut self, ctx: &StoreContext<'_>, event: &Event) -> Result<(), HandlerError> {
        (**self).handle(ctx, event)
    }
}

/// Adapts a closure into an [`EventHandler`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> EventHandler for FnHandler<F>
where
    F: FnMut(&StoreContext<'_>, &Event) -> Result<(), HandlerError> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&mut self, ctx: &StoreContext<'_>, event: &Event) -> Result<(), HandlerError> {
        (self.f)(ctx, event)
    }
}

/// Wraps `f` as a named handler.
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: FnMut(&StoreContext<'_>, &Event) -> Result<(), HandlerError> + Send + 'static,
{
    FnHandler {
        name: name.into(),
        f,
    }
}
