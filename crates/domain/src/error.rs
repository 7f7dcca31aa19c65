//! Rules oracle error types.

use thiserror::Error;

/// Errors reported by a rules oracle.
///
/// These never escape to the caller that submitted a request: the move
/// handler turns them into a failure event in the game's own stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The command text could not be parsed.
    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// The command is well-formed but not legal in the current state.
    #[error("illegal move {command}: {reason}")]
    IllegalMove { command: String, reason: String },

    /// The game has already ended.
    #[error("game is already over")]
    GameOver,
}

impl RulesError {
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        RulesError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn illegal(command: impl ToString, reason: impl Into<String>) -> Self {
        RulesError::IllegalMove {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for rules operations.
pub type Result<T> = std::result::Result<T, RulesError>;
