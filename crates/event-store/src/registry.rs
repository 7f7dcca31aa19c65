//! Ordered collection of registered handlers.

use crate::handler::{EventHandler, HandlerToken};

/// Registered handlers, kept in registration order.
///
/// Owned and mutated exclusively by the dispatcher.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Vec<(HandlerToken, Box<dyn EventHandler>)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler. Registering the same token twice keeps both entries.
    pub fn register(&mut self, token: HandlerToken, handler: Box<dyn EventHandler>) {
        self.entries.push((token, handler));
    }

    /// Removes the handler registered under `token`.
    ///
    /// Returns the removed handler, or `None` if the token is unknown.
    pub fn deregister(&mut self, token: HandlerToken) -> Option<Box<dyn EventHandler>> {
        let index = self.entries.iter().position(|(t, _)| *t == token)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, token: HandlerToken) -> bool {
        self.entries.iter().any(|(t, _)| *t == token)
    }

    /// Tokens in registration order.
    pub fn tokens(&self) -> impl Iterator<Item = HandlerToken> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    pub(crate) fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (HandlerToken, &mut Box<dyn EventHandler>)> + '_ {
        self.entries.iter_mut().map(|(t, h)| (*t, h))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(t, h)| (t, h.name())))
            .finish()
    }
}
