//! Line-based console transport
//!
//! Reads session events from stdin, one per line, for running the daemon
//! without a network front end:
//!
//! ```text
//! connect <session>
//! disconnect <session>
//! status <session>
//! stop <session>
//! command <session> <channel> <speed> <reverse> <brake>
//! shutdown
//! ```
//!
//! Speed and brake are clamped into 0-100; any non-zero `reverse` selects
//! reverse. End of input shuts the daemon down.

use std::io::{self, BufRead};
use std::thread;

use embassy_futures::block_on;
use log::{info, warn};
use thiserror::Error;

use platter_core::actuation::{ChannelCommand, Direction};
use platter_core::config::ChannelId;
use platter_core::scheduler::SessionId;
use platter_daemon::Inbound;

use crate::channels::INBOUND;

/// Malformed console line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Parse one console line
pub fn parse_line(line: &str) -> Result<Inbound, ParseError> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ParseError::Empty)?;

    let event = match verb {
        "connect" => Inbound::Connect(session(&mut words)?),
        "disconnect" => Inbound::Disconnect(session(&mut words)?),
        "status" => Inbound::Status(session(&mut words)?),
        "stop" => Inbound::StopAll(session(&mut words)?),
        "command" => {
            let session = session(&mut words)?;
            let channel = ChannelId(number(&mut words, "channel")?);
            let speed = number(&mut words, "speed")?;
            let reverse: i32 = number(&mut words, "direction")?;
            let brake = number(&mut words, "brake")?;
            Inbound::Command {
                session,
                channel,
                command: ChannelCommand::from_ui(speed, Direction::from_flag(reverse != 0), brake),
            }
        }
        "shutdown" => Inbound::Shutdown,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(event)
}

fn session<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<SessionId, ParseError> {
    number(words, "session").map(SessionId)
}

fn number<'a, T: std::str::FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, ParseError> {
    let word = words.next().ok_or(ParseError::MissingArgument(name))?;
    word.parse()
        .map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

/// Start the stdin reader thread
pub fn spawn() -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console".into())
        .spawn(run)
}

fn run() {
    info!("Console transport reading stdin");

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("console read failed: {}", e);
                break;
            }
        };
        match parse_line(&line) {
            Ok(event) => block_on(INBOUND.send(event)),
            Err(ParseError::Empty) => {}
            Err(e) => warn!("console: {}", e),
        }
    }

    block_on(INBOUND.send(Inbound::Shutdown));
}
