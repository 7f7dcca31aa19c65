//! Composition root for the game runtime.
//!
//! [`App`] starts a dispatcher, installs the move and status handlers and
//! keeps the read models. Everything it exposes is a thin layer over the event
//! store: commands are submitted as events, reads replay a log snapshot.

pub mod config;
pub mod driver;
pub mod error;

use std::sync::Arc;

use common::{AggregateId, IdGenerator, UuidGenerator};
use domain::{AggregateState, Cutoff, GameStatus, Rules, replay};
use event_store::{
    Event, EventId, EventQuery, EventStore, EventType, HandlerToken, NewEvent,
};
use projections::{GameHistory, GameHistoryView, ProjectionProcessor, Scores, ScoreboardView};
use saga::{GameHandlers, GameObserver, Signal};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

pub use config::{Config, LogFormat};
pub use error::{AppError, Result};

/// A registered watcher of one game.
///
/// Dropping the watch is enough to stop it: the observer deregisters itself
/// the next time it has something to report.
#[derive(Debug)]
pub struct Watch {
    pub token: HandlerToken,
    pub aggregate_id: AggregateId,
    signals: mpsc::UnboundedReceiver<Signal>,
}

impl Watch {
    /// Waits for the next signal. Returns `None` once the observer is gone.
    pub async fn next(&mut self) -> Option<Signal> {
        self.signals.recv().await
    }
}

/// The running application.
pub struct App<R: Rules> {
    store: EventStore,
    dispatcher: JoinHandle<()>,
    rules: Arc<R>,
    ids: Box<dyn IdGenerator>,
    handlers: GameHandlers,
    processor: Mutex<ProjectionProcessor>,
    history: GameHistoryView,
    scores: ScoreboardView,
}

impl<R: Rules> App<R> {
    /// Starts an application on the current Tokio runtime, minting game ids
    /// with a [`UuidGenerator`].
    pub fn new(rules: R) -> Result<Self> {
        Self::with_generator(rules, UuidGenerator::new())
    }

    /// Starts an application that mints game ids with `ids`.
    pub fn with_generator(rules: R, ids: impl IdGenerator + 'static) -> Result<Self> {
        let rules = Arc::new(rules);
        let (store, dispatcher) = EventStore::spawn();
        let handlers = saga::register_game_handlers(&store, Arc::clone(&rules))?;

        let history = GameHistoryView::new();
        let scores = ScoreboardView::new();
        let mut processor = ProjectionProcessor::new(store.clone());
        processor.register(Box::new(history.clone()));
        processor.register(Box::new(scores.clone()));

        tracing::info!(
            moves = %handlers.moves,
            status = %handlers.status,
            "application started"
        );
        Ok(Self {
            store,
            dispatcher,
            rules,
            ids: Box::new(ids),
            handlers,
            processor: Mutex::new(processor),
            history,
            scores,
        })
    }

    /// The underlying store handle.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Tokens of the standard handlers.
    pub fn handlers(&self) -> GameHandlers {
        self.handlers
    }

    /// Creates a game with a fresh id.
    pub fn create_game(&self) -> Result<AggregateId> {
        let id = self.ids.generate();
        self.create_game_with_id(id.clone())?;
        Ok(id)
    }

    /// Creates (or restarts) the game with the given id.
    #[tracing::instrument(skip(self), fields(aggregate_id = %id))]
    pub fn create_game_with_id(&self, id: AggregateId) -> Result<()> {
        self.store
            .commit(NewEvent::bare(id, EventType::GameCreated))?;
        Ok(())
    }

    /// Submits a move request. The outcome is recorded asynchronously as a
    /// success or failure event in the game's stream.
    #[tracing::instrument(skip(self), fields(aggregate_id = %id))]
    pub fn submit_move(&self, id: &AggregateId, command: &str) -> Result<()> {
        self.store.commit(NewEvent::new(
            id.clone(),
            EventType::MoveRequested,
            command,
        ))?;
        Ok(())
    }

    /// Replays the game up to `cutoff`.
    pub async fn board(&self, id: &AggregateId, cutoff: Cutoff) -> Result<R::State> {
        let events = self.store.query(EventQuery::for_aggregate(id.clone())).await?;
        match replay(self.rules.as_ref(), &events, id, cutoff) {
            AggregateState::Initialized(state) => Ok(state),
            AggregateState::Uninitialized => Err(AppError::GameNotFound(id.clone())),
        }
    }

    /// Current status of the game.
    pub async fn status(&self, id: &AggregateId) -> Result<GameStatus> {
        let state = self.board(id, Cutoff::Latest).await?;
        Ok(self.rules.status(&state))
    }

    /// A snapshot of the whole log.
    pub async fn events(&self) -> Result<Vec<Event>> {
        Ok(self.store.events().await?)
    }

    /// Ids of the game's events, for use as replay cutoffs.
    pub async fn event_ids(&self, id: &AggregateId) -> Result<Vec<EventId>> {
        self.catch_up().await?;
        Ok(self.history.event_ids(id))
    }

    /// History of one game.
    pub async fn history(&self, id: &AggregateId) -> Result<GameHistory> {
        self.catch_up().await?;
        self.history
            .get(id)
            .ok_or_else(|| AppError::GameNotFound(id.clone()))
    }

    /// Games counted by outcome.
    pub async fn scores(&self) -> Result<Scores> {
        self.catch_up().await?;
        Ok(self.scores.scores())
    }

    async fn catch_up(&self) -> Result<()> {
        self.processor.lock().await.run_catch_up().await?;
        Ok(())
    }

    /// Starts watching a game's move results.
    #[tracing::instrument(skip(self), fields(aggregate_id = %id))]
    pub fn watch(&self, id: &AggregateId) -> Result<Watch> {
        let (token, signals) = GameObserver::watch(&self.store, id.clone())?;
        tracing::debug!(%token, "watch registered");
        Ok(Watch {
            token,
            aggregate_id: id.clone(),
            signals,
        })
    }

    /// Stops a watch. Unknown tokens are ignored.
    pub fn unwatch(&self, token: HandlerToken) -> Result<()> {
        self.store.deregister(token)?;
        Ok(())
    }

    /// Stops the dispatcher once every request already submitted has been
    /// processed, along with whatever the handlers commit in reaction, and
    /// waits for it.
    pub async fn shutdown(self) -> Result<()> {
        self.store.shutdown()?;
        self.dispatcher.await?;
        tracing::info!("application stopped");
        Ok(())
    }
}
