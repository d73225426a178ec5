//! Line commands typed at the prompt.

use client_core::Action;
use shared::domain::{HistoryQuery, Measurement, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(Action),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for the list of commands")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

const LOGIN_USAGE: &str = "login <username> <password>";
const REGISTER_USAGE: &str = "register <username> <password>";
const SET_USAGE: &str = "set <sepal_length> <sepal_width> <petal_length> <petal_width>";
const HISTORY_USAGE: &str = "history <limit> [offset]";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "login" => {
            let (username, password) = credentials(&args, LOGIN_USAGE)?;
            Command::Action(Action::Login { username, password })
        }
        "register" => {
            let (username, password) = credentials(&args, REGISTER_USAGE)?;
            Command::Action(Action::Register { username, password })
        }
        "logout" => no_args(&args, "logout", Command::Action(Action::Logout))?,
        "set" => {
            let [sl, sw, pl, pw] = args.as_slice() else {
                return Err(CommandError::Usage(SET_USAGE));
            };
            let measurement =
                Measurement::new(number(sl)?, number(sw)?, number(pl)?, number(pw)?)?;
            Command::Action(Action::SetMeasurement(measurement))
        }
        "predict" => no_args(&args, "predict", Command::Action(Action::Predict))?,
        "history" => {
            let (limit, offset) = match args.as_slice() {
                [limit] => (count(limit)?, 0),
                [limit, offset] => (count(limit)?, count(offset)?),
                _ => return Err(CommandError::Usage(HISTORY_USAGE)),
            };
            Command::Action(Action::SetHistoryQuery(HistoryQuery::new(limit, offset)?))
        }
        "next" => no_args(&args, "next", Command::Action(Action::NextPage))?,
        "prev" => no_args(&args, "prev", Command::Action(Action::PreviousPage))?,
        "refresh" => no_args(&args, "refresh", Command::Action(Action::Refresh))?,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn credentials(args: &[&str], usage: &'static str) -> Result<(String, String), CommandError> {
    match args {
        [username, password] => Ok((username.to_string(), password.to_string())),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn no_args(
    args: &[&str],
    usage: &'static str,
    command: Command,
) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::Usage(usage))
    }
}

fn number(raw: &str) -> Result<f64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

fn count(raw: &str) -> Result<u32, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}
