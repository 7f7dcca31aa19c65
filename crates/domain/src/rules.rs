//! The rules oracle contract.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Status of a game as judged by the rules.
///
/// ```text
/// Ongoing ──┬──► FirstPlayerWins
///           ├──► SecondPlayerWins
///           └──► Draw
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Ongoing,
    FirstPlayerWins,
    SecondPlayerWins,
    Draw,
}

impl GameStatus {
    /// Returns true if the game has ended.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::FirstPlayerWins => "first_player_wins",
            GameStatus::SecondPlayerWins => "second_player_wins",
            GameStatus::Draw => "draw",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain rules, consulted by the replay engine and the reactive handlers.
///
/// The runtime treats the rules as an oracle: it never inspects a state or a
/// command, it only parses, applies and asks for the status. Implementations
/// must be deterministic, since replay relies on applying the same commands
/// to the same states giving the same results.
pub trait Rules: Send + Sync + 'static {
    /// The state of one game.
    type State: Clone + std::fmt::Debug + PartialEq + Send + Sync;

    /// A parsed command.
    type Command: Clone + std::fmt::Debug + std::fmt::Display + Send + Sync;

    /// Returns the state of a freshly created game.
    fn initial(&self) -> Self::State;

    /// Parses the payload of a request or success event.
    fn parse_command(&self, input: &str) -> Result<Self::Command>;

    /// Applies a command, returning the next state or the reason it is illegal.
    fn apply(&self, state: &Self::State, command: &Self::Command) -> Result<Self::State>;

    /// Judges whether the game is over and who won.
    fn status(&self, state: &Self::State) -> GameStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_ongoing() {
        assert_eq!(GameStatus::default(), GameStatus::Ongoing);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!GameStatus::Ongoing.is_terminal());
        assert!(GameStatus::FirstPlayerWins.is_terminal());
        assert!(GameStatus::SecondPlayerWins.is_terminal());
        assert!(GameStatus::Draw.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        for status in [
            GameStatus::Ongoing,
            GameStatus::FirstPlayerWins,
            GameStatus::SecondPlayerWins,
            GameStatus::Draw,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
