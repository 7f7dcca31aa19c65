use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::dispatcher::{Dispatcher, Request};
use crate::error::{EventStoreError, Result};
use crate::handler::{EventHandler, HandlerToken};
use crate::{Event, EventQuery, NewEvent};

/// Handle to a running dispatcher.
///
/// Handles are cheap to clone and can be shared freely between tasks. All
/// writes are fire-and-forget: they enqueue a request and return without
/// waiting for the dispatcher. The only errors they report are that the
/// dispatcher has stopped or is shutting down.
#[derive(Clone)]
pub struct EventStore {
    tx: mpsc::UnboundedSender<Request>,
    tokens: Arc<AtomicU64>,
    closing: Arc<AtomicBool>,
    // Handles given to handlers keep working while a shutdown drains the queue.
    internal: bool,
}

impl EventStore {
    /// Starts a dispatcher with an empty log on the current Tokio runtime.
    ///
    /// The dispatcher runs until [`EventStore::shutdown`] is called or the
    /// last handle is dropped. The returned join handle completes when it
    /// stops.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tokens = Arc::new(AtomicU64::new(0));
        let closing = Arc::new(AtomicBool::new(false));
        let dispatcher = Dispatcher::new(
            rx,
            tx.downgrade(),
            Arc::clone(&tokens),
            Arc::clone(&closing),
        );
        let handle = tokio::spawn(dispatcher.run().instrument(tracing::info_span!("dispatcher")));
        let store = Self {
            tx,
            tokens,
            closing,
            internal: false,
        };
        (store, handle)
    }

    /// A handle for handlers, which may still submit requests while a
    /// shutdown drains the queue.
    pub(crate) fn from_parts(
        tx: mpsc::UnboundedSender<Request>,
        tokens: Arc<AtomicU64>,
        closing: Arc<AtomicBool>,
    ) -> Self {
        Self {
            tx,
            tokens,
            closing,
            internal: true,
        }
    }

    fn accepting(&self) -> bool {
        self.internal || !self.closing.load(Ordering::SeqCst)
    }

    fn send(&self, request: Request) -> Result<()> {
        if !self.accepting() {
            return Err(EventStoreError::DispatcherClosed);
        }
        self.tx
            .send(request)
            .map_err(|_| EventStoreError::DispatcherClosed)
    }

    /// Queues an event for commit.
    ///
    /// The dispatcher assigns the id when it processes the request. Commits
    /// from independent callers are processed in arrival order, which is not
    /// necessarily the order in which they were issued.
    pub fn commit(&self, event: NewEvent) -> Result<()> {
        self.send(Request::Commit(event))
    }

    /// Queues a handler registration and returns its token.
    ///
    /// The handler sees every event committed after the registration is
    /// processed.
    pub fn register(&self, handler: impl EventHandler) -> Result<HandlerToken> {
        self.register_with(|_| handler)
    }

    /// Like [`EventStore::register`], for handlers that need to know their own
    /// token, e.g. to deregister themselves.
    pub fn register_with<H, F>(&self, build: F) -> Result<HandlerToken>
    where
        H: EventHandler,
        F: FnOnce(HandlerToken) -> H,
    {
        let token = HandlerToken::new(self.tokens.fetch_add(1, Ordering::Relaxed));
        self.send(Request::Register(token, Box::new(build(token))))?;
        Ok(token)
    }

    /// Queues removal of a handler. Unknown tokens are ignored.
    pub fn deregister(&self, token: HandlerToken) -> Result<()> {
        self.send(Request::Deregister(token))
    }

    /// Returns a snapshot of the log.
    ///
    /// The snapshot contains every event committed before this request reached
    /// the dispatcher. It does not update afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn events(&self) -> Result<Vec<Event>> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Snapshot(reply))?;
        rx.await.map_err(|_| EventStoreError::ReplyDropped("snapshot"))
    }

    /// Returns the events of a snapshot that match `query`.
    pub async fn query(&self, query: EventQuery) -> Result<Vec<Event>> {
        Ok(query.apply(self.events().await?))
    }

    /// Asks the dispatcher to stop.
    ///
    /// Every request queued before this one is processed, and so is every
    /// request handlers submit while the queue drains. Requests from outside
    /// handlers are refused from the moment the dispatcher starts draining.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Request::Shutdown)
    }

    /// Returns true once the dispatcher has stopped accepting requests from
    /// this handle.
    pub fn is_closed(&self) -> bool {
        !self.accepting() || self.tx.is_closed()
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("closed", &self.is_closed())
            .finish()
    }
}
