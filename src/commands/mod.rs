pub mod game_commands;
pub mod roster_commands;

use std::io::Write;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::{
    api::RecorderApi,
    log::log_error,
    models::{Role, Team},
    session::GameForm,
    submission::GameSubmitter,
    RecorderError,
};

/// One line typed by the operator.
#[derive(Debug, Parser)]
#[command(
    name = "recorder",
    no_binary_name = true,
    disable_version_flag = true,
    about = "Record the outcome of a game"
)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

/// Everything the operator can do from the console. Slots are numbered 1 to 5.
#[derive(Debug, Subcommand)]
enum ConsoleCommand {
    /// List the registered players
    Players,
    /// Fetch the registered players from the backend again
    Reload,
    /// Put a registered player into a slot, by id
    Bind {
        team: Team,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        slot: u8,
        id: String,
    },
    /// Put somebody who is not registered into a slot
    Custom {
        team: Team,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        slot: u8,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        nickname: Vec<String>,
    },
    /// Type a name into a slot; registered nicknames match regardless of case
    Name {
        team: Team,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        slot: u8,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Change the role played by the player in a slot
    Role {
        team: Team,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        slot: u8,
        role: Role,
    },
    /// Make the player in a slot the team's captain
    Captain {
        team: Team,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        slot: u8,
    },
    /// Pick the winning team
    Winner { team: Team },
    /// Set when the game was played (RFC 3339, e.g. 2024-05-01T20:30:00+02:00)
    Time {
        #[arg(value_parser = parse_time)]
        time: DateTime<Utc>,
    },
    /// Show both rosters
    Show,
    /// List what the backend would reject about the current game
    Validate,
    /// Save the game
    Submit,
    /// Leave the recorder
    #[command(alias = "exit")]
    Quit,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

/// What the console loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The operator's console: a game form plus the means to save it.
pub struct Console<A> {
    form: GameForm,
    submitter: GameSubmitter<A>,
    /// Refuse to submit games with validation problems.
    strict: bool,
}

impl<A: RecorderApi> Console<A> {
    pub fn new(form: GameForm, submitter: GameSubmitter<A>, strict: bool) -> Self {
        Self {
            form,
            submitter,
            strict,
        }
    }

    #[cfg(test)]
    pub fn form(&self) -> &GameForm {
        &self.form
    }

    /// Read commands until the input ends or the operator quits.
    pub async fn run<R, W>(&mut self, mut input: R, out: &mut W) -> Result<(), RecorderError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut buf = Vec::new();

        write!(out, "> ")?;
        out.flush()?;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim_end_matches(['\n', '\r']);
                    if self.execute(line, out).await? == Flow::Quit {
                        break;
                    }
                }
                Err(e) => {
                    let cause = e.to_string();
                    log_error(
                        out,
                        "That line was not valid text and was ignored",
                        vec![("Cause", cause.as_str())],
                    )?;
                }
            }
            write!(out, "> ")?;
            out.flush()?;
        }

        info!("Console closed");
        Ok(())
    }

    /// Run a single line. Typos and bad arguments are reported to the operator, only I/O
    /// failures on `out` are returned as errors.
    pub async fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, RecorderError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        let command = match ConsoleLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{}", e)?;
                return Ok(Flow::Continue);
            }
        };
        debug!("Running {:?}", command);

        match command {
            ConsoleCommand::Players => self.players(out)?,
            ConsoleCommand::Reload => self.reload(out).await?,
            ConsoleCommand::Bind { team, slot, id } => self.bind(out, team, slot, &id)?,
            ConsoleCommand::Custom {
                team,
                slot,
                nickname,
            } => {
                let nickname = text_after(line, 3).unwrap_or(nickname[0].as_str());
                self.custom(out, team, slot, nickname)?
            }
            ConsoleCommand::Name { team, slot, text } => {
                let text = text_after(line, 3).unwrap_or(text[0].as_str());
                self.name(out, team, slot, text)?
            }
            ConsoleCommand::Role { team, slot, role } => self.role(out, team, slot, role)?,
            ConsoleCommand::Captain { team, slot } => self.captain(out, team, slot)?,
            ConsoleCommand::Winner { team } => self.winner(out, team)?,
            ConsoleCommand::Time { time } => self.time(out, time)?,
            ConsoleCommand::Show => self.show(out)?,
            ConsoleCommand::Validate => self.validate(out)?,
            ConsoleCommand::Submit => self.submit(out).await?,
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}

/// Everything after the first `skip` words of `line`, spacing inside it left as typed.
fn text_after(line: &str, skip: usize) -> Option<&str> {
    let mut rest = line.trim_start();
    for _ in 0..skip {
        let end = rest.find(char::is_whitespace)?;
        rest = rest[end..].trim_start();
    }

    let rest = rest.trim_end();
    (!rest.is_empty()).then_some(rest)
}

/// Slots are 1-based for the operator and 0-based everywhere else.
pub(super) fn slot_index(slot: u8) -> usize {
    usize::from(slot).saturating_sub(1)
}
