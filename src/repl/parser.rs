//! Command Parser
//!
//! Parses a typed line into a [`Command`]. The grammar is a flat
//! whitespace-separated form: a command word, usually a key, and for `SET`
//! and `SET_EXPIRY` one trailing argument.
//!
//! `SET` values are JSON literals (`1`, `"text"`, `[1, 2]`, `{"a": 1}`).
//! Input that does not parse as JSON falls back to a plain string value, so
//! `SET name stash` stores the string `"stash"`.
//!
//! A malformed line yields a [`ParseError`]; the caller reports it and skips
//! the operation, the loop continues.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The input line is empty
    #[error("empty input")]
    EmptyInput,

    /// The command word is not recognized
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command needs a key and none was given
    #[error("{0} requires a key")]
    MissingKey(&'static str),

    /// SET was given no value
    #[error("SET requires a value")]
    MissingValue,

    /// SET_EXPIRY was given no seconds argument, or one that is not a number
    #[error("invalid seconds argument: {0:?}")]
    InvalidSeconds(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A parsed front-end command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Buffer a write of `value` for `key` and commit
    Set { key: String, value: Value },
    /// Read the value for `key`
    Get { key: String },
    /// Buffer a deletion of `key` and commit
    Delete { key: String },
    /// Buffer an expiry of `now + seconds` for `key` and commit
    SetExpiry { key: String, seconds: f64 },
    /// Read the expiry timestamp for `key`
    GetExpiry { key: String },
    /// Leave the loop; the caller writes the shutdown snapshot
    Exit,
}

/// Parses one input line into a [`Command`].
///
/// # Example
///
/// ```
/// use stashkv::repl::{parse_command, Command};
/// use serde_json::json;
///
/// let command = parse_command("SET name \"stash\"").unwrap();
/// assert_eq!(
///     command,
///     Command::Set { key: "name".to_string(), value: json!("stash") }
/// );
/// ```
pub fn parse_command(input: &str) -> ParseResult<Command> {
    let mut parts = input.split_whitespace();
    let word = parts.next().ok_or(ParseError::EmptyInput)?;

    match word {
        "SET" => {
            let key = parts.next().ok_or(ParseError::MissingKey("SET"))?;
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                return Err(ParseError::MissingValue);
            }
            Ok(Command::Set {
                key: key.to_string(),
                value: parse_value(&rest.join(" ")),
            })
        }
        "GET" => {
            let key = parts.next().ok_or(ParseError::MissingKey("GET"))?;
            Ok(Command::Get {
                key: key.to_string(),
            })
        }
        "DELETE" => {
            let key = parts.next().ok_or(ParseError::MissingKey("DELETE"))?;
            Ok(Command::Delete {
                key: key.to_string(),
            })
        }
        "SET_EXPIRY" => {
            let key = parts.next().ok_or(ParseError::MissingKey("SET_EXPIRY"))?;
            let raw = parts
                .next()
                .ok_or_else(|| ParseError::InvalidSeconds(String::new()))?;
            let seconds = raw
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidSeconds(raw.to_string()))?;
            Ok(Command::SetExpiry {
                key: key.to_string(),
                seconds,
            })
        }
        "GET_EXPIRY" => {
            let key = parts.next().ok_or(ParseError::MissingKey("GET_EXPIRY"))?;
            Ok(Command::GetExpiry {
                key: key.to_string(),
            })
        }
        "EXIT" => Ok(Command::Exit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// Parses a SET value: a JSON literal, with bare text falling back to a
/// plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
