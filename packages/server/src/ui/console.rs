//! Operator console: line commands typed on the server's stdin.

use std::{fmt::Write as _, sync::Arc};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::domain::{RoundPhase, SessionGateway};

const PROMPT: &str = "dotbox> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Help,
    ShowConnected,
    StartGame,
    NextRound,
    SwapPlayer,
    EndRound,
}

impl OperatorCommand {
    pub const ALL: [OperatorCommand; 6] = [
        OperatorCommand::Help,
        OperatorCommand::ShowConnected,
        OperatorCommand::StartGame,
        OperatorCommand::NextRound,
        OperatorCommand::SwapPlayer,
        OperatorCommand::EndRound,
    ];

    /// Parse one input line; case and surrounding or repeated whitespace are ignored
    pub fn parse(line: &str) -> Option<Self> {
        let normalized = line
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|command| command.keyword() == normalized)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::ShowConnected => "show connected",
            Self::StartGame => "start game",
            Self::NextRound => "next round",
            Self::SwapPlayer => "swap player",
            Self::EndRound => "end round",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Help => "list the available commands",
            Self::ShowConnected => "show the seated players and the observer count",
            Self::StartGame => "start the first round",
            Self::NextRound => "start a fresh round with the other player opening",
            Self::SwapPlayer => "give the first move of the pending round to the other player",
            Self::EndRound => "stop accepting moves for the current round",
        }
    }

    /// Run the command against the session and describe the result
    pub async fn execute(&self, session: &dyn SessionGateway) -> String {
        match self {
            Self::Help => help_text(),
            Self::ShowConnected => match session.snapshot().await {
                Ok(snapshot) => {
                    let mut out = format!(
                        "Round {} ({}), {} observer(s)",
                        snapshot.round,
                        phase_text(snapshot.phase),
                        snapshot.observer_count
                    );
                    if snapshot.players.is_empty() {
                        out.push_str("\n  no players connected");
                    }
                    for player in &snapshot.players {
                        let _ = write!(
                            out,
                            "\n  {}: {} ({:?}, {})",
                            player.slot, player.name, player.kind, player.connection_id
                        );
                    }
                    out
                }
                Err(e) => format!("Error: {}", e),
            },
            Self::StartGame => match session.start_round().await {
                Ok(()) => "Round started".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            Self::NextRound => match session.next_round().await {
                Ok(round) => format!("Round {} started", round),
                Err(e) => format!("Error: {}", e),
            },
            Self::SwapPlayer => match session.swap_starting_player().await {
                Ok(first) => format!("{} will move first", first),
                Err(e) => format!("Error: {}", e),
            },
            Self::EndRound => match session.end_round().await {
                Ok(()) => "Round ended".to_string(),
                Err(e) => format!("Error: {}", e),
            },
        }
    }
}

fn help_text() -> String {
    let mut out = String::from("Commands:");
    for command in OperatorCommand::ALL {
        let _ = write!(out, "\n  {:<16}{}", command.keyword(), command.description());
    }
    out
}

fn phase_text(phase: RoundPhase) -> &'static str {
    match phase {
        RoundPhase::NotStarted => "not started",
        RoundPhase::InProgress => "in progress",
        RoundPhase::Suspended => "ended",
        RoundPhase::GameOver => "game over",
    }
}

/// Read commands from stdin until EOF and run them against the session.
///
/// Readline runs on its own thread since it blocks.
pub async fn run_console(session: Arc<dyn SessionGateway>) {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    tracing::info!("Operator console closed");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    println!("Type 'help' for the list of commands");
    while let Some(line) = input_rx.recv().await {
        match OperatorCommand::parse(&line) {
            Some(command) => {
                tracing::debug!("Operator command: {}", command.keyword());
                println!("{}", command.execute(session.as_ref()).await);
            }
            None => println!("Unknown command '{}'. Type 'help' for the list", line),
        }
    }
}
