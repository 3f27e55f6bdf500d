//! Terminal command parsing.
//!
//! One command per line, whitespace separated:
//!
//! ```text
//! connect
//! create <recipient> <flow rate>
//! update <recipient> <flow rate>
//! delete <recipient>
//! rate <amount per second>
//! unwrap
//! status | help | quit
//! ```

use flowstream::{parse_address, Address, FlowRate, StreamError, StreamOperation};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Invalid(#[from] StreamError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Connect,
    Execute(StreamOperation),
    /// Raw input, validated by the calculator.
    Rate(String),
    Unwrap,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "connect" => Command::Connect,
            "create" => {
                let (recipient, flow_rate) = stream_args(&args, "create <recipient> <flow rate>")?;
                Command::Execute(StreamOperation::Create {
                    recipient,
                    flow_rate,
                })
            }
            "update" => {
                let (recipient, flow_rate) = stream_args(&args, "update <recipient> <flow rate>")?;
                Command::Execute(StreamOperation::Update {
                    recipient,
                    flow_rate,
                })
            }
            "delete" => match args.as_slice() {
                [recipient] => Command::Execute(StreamOperation::Delete {
                    recipient: parse_address(recipient)?,
                }),
                _ => return Err(CommandError::Usage("delete <recipient>")),
            },
            // An empty amount is valid and projects to zero.
            "rate" => Command::Rate(args.join(" ")),
            "unwrap" => Command::Unwrap,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn stream_args(
    args: &[&str],
    usage: &'static str,
) -> Result<(Address, FlowRate), CommandError> {
    match args {
        [recipient, rate] => Ok((parse_address(recipient)?, rate.parse::<FlowRate>()?)),
        _ => Err(CommandError::Usage(usage)),
    }
}
