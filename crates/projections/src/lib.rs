//! Read models built from the event log.
//!
//! This crate provides the query side of the runtime:
//! - [`Projection`] trait for folding committed events into read models
//! - [`ReadModel`] trait for query access to the folded data
//! - [`ProjectionProcessor`] for catching projections up with a log snapshot
//! - Two views: per-game history and the scoreboard

pub mod error;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use views::{GameHistory, GameHistoryView, Scores, ScoreboardView};
