//! The single-writer control loop.
//!
//! The dispatcher task owns the event log and the handler registry. Every
//! mutation arrives as a [`Request`] on one unbounded channel and is applied
//! in arrival order, so neither structure needs a lock:
//!
//! ```text
//! EventStore handles ──► Request queue ──► Dispatcher::run
//!        ▲                                   │
//!        │                                   ├─ Commit:    assign id, append, fan out
//!        │                                   ├─ Register / Deregister: mutate registry
//!        │                                   └─ Snapshot:  clone the log for a reader
//!        │                                   │
//!        └──────── StoreContext (handlers) ◄─┘
//! ```
//!
//! Requests a handler submits while an event is being fanned out go to the
//! back of the same queue, so every handler sees an event before any handler
//! sees the events it caused.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};

use crate::error::{EventStoreError, Result};
use crate::handler::{EventHandler, HandlerToken};
use crate::registry::HandlerRegistry;
use crate::store::EventStore;
use crate::{Event, EventId, NewEvent};

/// A message for the dispatcher.
pub(crate) enum Request {
    Commit(NewEvent),
    Register(HandlerToken, Box<dyn EventHandler>),
    Deregister(HandlerToken),
    Snapshot(oneshot::Sender<Vec<Event>>),
    Shutdown,
}

/// The store as seen from inside a handler.
///
/// Reads go straight to the dispatcher's log, which already contains the event
/// being handled. Writes are queued like any other request.
pub struct StoreContext<'a> {
    log: &'a [Event],
    store: Option<&'a EventStore>,
}

impl<'a> StoreContext<'a> {
    /// The committed log, up to and including the event being handled.
    pub fn events(&self) -> &'a [Event] {
        self.log
    }

    /// A handle for submitting requests from outside the callback, e.g. from
    /// a task spawned to do blocking work.
    pub fn store(&self) -> Result<&'a EventStore> {
        self.store.ok_or(EventStoreError::DispatcherClosed)
    }

    /// Queues `event` for commit after the current fan-out.
    pub fn commit(&self, event: NewEvent) -> Result<()> {
        self.store()?.commit(event)
    }

    /// Queues a registration. The new handler does not see the current event.
    pub fn register(&self, handler: impl EventHandler) -> Result<HandlerToken> {
        self.store()?.register(handler)
    }

    /// Queues a removal. The removed handler still sees the current event.
    pub fn deregister(&self, token: HandlerToken) -> Result<()> {
        self.store()?.deregister(token)
    }
}

pub(crate) struct Dispatcher {
    log: Vec<Event>,
    registry: HandlerRegistry,
    requests: mpsc::UnboundedReceiver<Request>,
    sender: mpsc::WeakUnboundedSender<Request>,
    tokens: Arc<AtomicU64>,
    closing: Arc<AtomicBool>,
}

impl Dispatcher {
    pub(crate) fn new(
        requests: mpsc::UnboundedReceiver<Request>,
        sender: mpsc::WeakUnboundedSender<Request>,
        tokens: Arc<AtomicU64>,
        closing: Arc<AtomicBool>,
    ) -> Self {
        Self {
            log: Vec::new(),
            registry: HandlerRegistry::new(),
            requests,
            sender,
            tokens,
            closing,
        }
    }

    /// Processes requests until a shutdown request arrives or every
    /// [`EventStore`] handle has been dropped.
    ///
    /// On shutdown the store stops accepting requests from outside, but
    /// everything already queued is still processed, including the requests
    /// handlers submit while the queue drains.
    pub(crate) async fn run(mut self) {
        tracing::debug!("dispatcher started");

        while let Some(request) = self.requests.recv().await {
            if !self.process(request) {
                break;
            }
        }

        self.closing.store(true, Ordering::SeqCst);
        let mut drained = 0usize;
        while let Ok(request) = self.requests.try_recv() {
            self.process(request);
            drained += 1;
        }

        // Requests sent while the flag was being raised. Handlers reacting to
        // these get `DispatcherClosed` back instead of being dropped silently.
        self.requests.close();
        while let Ok(request) = self.requests.try_recv() {
            self.process(request);
            drained += 1;
        }

        tracing::info!(
            events = self.log.len(),
            handlers = self.registry.len(),
            drained_requests = drained,
            "dispatcher stopped"
        );
    }

    /// Applies one request. Returns false for a shutdown request.
    fn process(&mut self, request: Request) -> bool {
        match request {
            Request::Commit(event) => self.commit(event),
            Request::Register(token, handler) => self.register(token, handler),
            Request::Deregister(token) => self.deregister(token),
            Request::Snapshot(reply) => {
                // The reader may have given up waiting.
                let _ = reply.send(self.log.clone());
            }
            Request::Shutdown => return false,
        }
        true
    }

    fn next_id(&self) -> EventId {
        self.log.last().map_or(EventId::first(), |last| last.id.next())
    }

    fn commit(&mut self, candidate: NewEvent) {
        let event = candidate.commit(self.next_id());
        tracing::debug!(
            event_id = %event.id,
            aggregate_id = %event.aggregate_id,
            event_type = %event.event_type,
            "event committed"
        );
        metrics::counter!(
            "event_store_events_committed_total",
            "event_type" => event.event_type.as_str()
        )
        .increment(1);

        self.log.push(event);
        self.fan_out();
    }

    /// Invokes every registered handler, in order, with the last event.
    fn fan_out(&mut self) {
        let Self {
            log,
            registry,
            sender,
            tokens,
            closing,
            ..
        } = self;
        let Some(event) = log.last() else {
            return;
        };

        let store = sender
            .upgrade()
            .map(|tx| EventStore::from_parts(tx, Arc::clone(tokens), Arc::clone(closing)));
        let ctx = StoreContext {
            log: log.as_slice(),
            store: store.as_ref(),
        };

        let started = Instant::now();
        for (token, handler) in registry.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| handler.handle(&ctx, event))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    metrics::counter!("event_store_handler_faults_total").increment(1);
                    tracing::error!(
                        %token,
                        handler = handler.name(),
                        event_id = %event.id,
                        %error,
                        "event handler failed"
                    );
                }
                Err(payload) => {
                    metrics::counter!("event_store_handler_faults_total").increment(1);
                    tracing::error!(
                        %token,
                        handler = handler.name(),
                        event_id = %event.id,
                        panic = %panic_message(payload.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }
        metrics::histogram!("event_store_fanout_duration_seconds")
            .record(started.elapsed().as_secs_f64());
    }

    fn register(&mut self, token: HandlerToken, handler: Box<dyn EventHandler>) {
        tracing::debug!(%token, handler = handler.name(), "event handler registered");
        self.registry.register(token, handler);
        metrics::gauge!("event_store_handlers_registered").set(self.registry.len() as f64);
    }

    fn deregister(&mut self, token: HandlerToken) {
        match self.registry.deregister(token) {
            Some(handler) => {
                tracing::debug!(%token, handler = handler.name(), "event handler deregistered");
                metrics::gauge!("event_store_handlers_registered")
                    .set(self.registry.len() as f64);
            }
            None => tracing::debug!(%token, "deregistration of unknown handler ignored"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
