//! Line-oriented command driver.
//!
//! One command per line:
//!
//! ```text
//! new                        create a game, print its id
//! move <game> <cell>         request a move
//! board <game> [event-id]    print the board, optionally as of an event
//! history <game>             print event ids and accepted moves
//! events                     print the whole log, one JSON event per line
//! scores                     print the scoreboard
//! watch <game>               print 1/0 for every accepted/rejected move
//! quit                       stop
//! ```

use std::str::FromStr;

use common::AggregateId;
use domain::{Cutoff, Rules, TicTacToe};
use event_store::EventId;

use crate::{App, AppError, Result, Watch};

const COMMANDS: [&str; 9] = [
    "new", "move", "board", "history", "events", "scores", "watch", "quit", "exit",
];

/// A parsed driver line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Move { game: AggregateId, cell: String },
    Board { game: AggregateId, cutoff: Cutoff },
    History { game: AggregateId },
    Events,
    Scores,
    Watch { game: AggregateId },
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["new"] => Command::New,
            ["move", game, cell] => Command::Move {
                game: AggregateId::new(*game),
                cell: cell.to_string(),
            },
            ["board", game] => Command::Board {
                game: AggregateId::new(*game),
                cutoff: Cutoff::Latest,
            },
            ["board", game, cutoff] => {
                let id: u64 = cutoff
                    .parse()
                    .map_err(|_| AppError::Usage(format!("invalid event id '{cutoff}'")))?;
                Command::Board {
                    game: AggregateId::new(*game),
                    cutoff: Cutoff::At(EventId::new(id)),
                }
            }
            ["history", game] => Command::History {
                game: AggregateId::new(*game),
            },
            ["events"] => Command::Events,
            ["scores"] => Command::Scores,
            ["watch", game] => Command::Watch {
                game: AggregateId::new(*game),
            },
            ["quit"] | ["exit"] => Command::Quit,
            [] => return Err(AppError::Usage("empty command".to_string())),
            [name, ..] if COMMANDS.contains(name) => {
                return Err(AppError::Usage(format!("wrong arguments for '{name}'")));
            }
            [name, ..] => return Err(AppError::Usage(format!("unknown command '{name}'"))),
        };
        Ok(command)
    }
}

/// What the driver should do after running a command.
#[derive(Debug)]
pub enum Output {
    /// Print the text.
    Text(String),
    /// Start forwarding the watch's signals.
    Watch(Watch),
    /// Stop reading commands.
    Quit,
}

/// Runs one command against the application.
pub async fn execute(app: &App<TicTacToe>, command: Command) -> Result<Output> {
    let text = match command {
        Command::New => app.create_game()?.to_string(),
        Command::Move { game, cell } => {
            app.submit_move(&game, &cell)?;
            format!("requested {cell} in {game}")
        }
        Command::Board { game, cutoff } => {
            let board = app.board(&game, cutoff).await?;
            let status = TicTacToe.status(&board);
            format!("{}to move: {}, status: {status}", board.render(), board.to_move())
        }
        Command::History { game } => {
            let history = app.history(&game).await?;
            let ids: Vec<String> = history.event_ids.iter().map(ToString::to_string).collect();
            let mut text = format!("events: {}\nmoves: {}", ids.join(" "), history.moves.join(" "));
            if let Some(outcome) = history.outcome {
                text.push_str(&format!("\noutcome: {outcome}"));
            }
            text
        }
        Command::Events => {
            let lines = app
                .events()
                .await?
                .iter()
                .map(serde_json::to_string)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| AppError::Usage(format!("cannot encode event: {e}")))?;
            lines.join("\n")
        }
        Command::Scores => app.scores().await?.to_string(),
        Command::Watch { game } => return Ok(Output::Watch(app.watch(&game)?)),
        Command::Quit => return Ok(Output::Quit),
    };
    Ok(Output::Text(text))
}
