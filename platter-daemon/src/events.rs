//! Session events and outbound notifications
//!
//! The transport turns client traffic into [`Inbound`] events. Every
//! observable transition of the scheduler or the actuation layer is
//! reported as a [`Notification`], addressed to one session or broadcast to
//! all of them. The transport layer decides how they reach the clients.

use core::fmt;

use platter_core::actuation::{ChannelCommand, Direction};
use platter_core::config::ChannelId;
use platter_core::scheduler::SessionId;

/// Session events delivered by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// A client connected
    Connect(SessionId),
    /// A client went away
    Disconnect(SessionId),
    /// Channel command from a client
    Command {
        session: SessionId,
        channel: ChannelId,
        command: ChannelCommand,
    },
    /// Stop-all request from a client
    StopAll(SessionId),
    /// Status query from a client
    Status(SessionId),
    /// Stop every channel, release the pins and exit
    Shutdown,
}

/// Who a notification is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A single session
    Session(SessionId),
    /// Every connected session
    Broadcast,
}

/// A session's view of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// The session holds the controls
    pub controlling: bool,
    /// Position in the queue, `None` if not queued
    pub position: Option<usize>,
    /// Number of queued sessions
    pub queue_length: usize,
    /// Time left before control rotates (controller only, someone waiting)
    pub time_remaining_ms: Option<u64>,
}

/// Observable events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The session now holds the controls
    ControlGranted,
    /// The session waits at `position`
    Queued { position: usize },
    /// Someone joined or left
    QueueLengthChanged { queue_length: usize },
    /// The session's time-box ran out
    Timeout,
    /// A channel command was applied (clamped values)
    ChannelUpdated {
        channel: ChannelId,
        command: ChannelCommand,
    },
    /// Every channel was stopped on request
    AllStopped,
    /// A pin write failed
    ActuationFault {
        /// Channel whose outputs are unknown, if known
        channel: Option<ChannelId>,
        message: String,
    },
    /// A request was rejected
    Rejected { message: String },
    /// Reply to a status query, also sent after every change of position
    StatusUpdate(Status),
}

/// An event and its recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Where the event goes
    pub recipient: Recipient,
    /// What happened
    pub event: Event,
}

impl Notification {
    /// Notification for one session
    pub fn to(session: SessionId, event: Event) -> Self {
        Self {
            recipient: Recipient::Session(session),
            event,
        }
    }

    /// Notification for every session
    pub fn broadcast(event: Event) -> Self {
        Self {
            recipient: Recipient::Broadcast,
            event,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Session(session) => write!(f, "{}", session),
            Recipient::Broadcast => f.write_str("all"),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ControlGranted => f.write_str("You have control"),
            Event::Queued { position } => write!(f, "You are #{} in queue", position),
            Event::QueueLengthChanged { queue_length } => {
                write!(f, "{} in queue", queue_length)
            }
            Event::Timeout => f.write_str("Your time is up"),
            Event::ChannelUpdated { channel, command } => {
                let direction = match command.direction {
                    Direction::Forward => "forward",
                    Direction::Reverse => "reverse",
                };
                write!(
                    f,
                    "channel {} speed {} {} brake {}",
                    channel, command.speed, direction, command.brake
                )
            }
            Event::AllStopped => f.write_str("All channels stopped"),
            Event::ActuationFault {
                channel: Some(channel),
                message,
            } => write!(f, "Channel {}: {}", channel, message),
            Event::ActuationFault {
                channel: None,
                message,
            } => f.write_str(message),
            Event::Rejected { message } => f.write_str(message),
            Event::StatusUpdate(status) => {
                match (status.controlling, status.position) {
                    (true, _) => f.write_str("controlling")?,
                    (false, Some(position)) => write!(f, "position {}", position)?,
                    (false, None) => f.write_str("not queued")?,
                }
                write!(f, ", {} in queue", status.queue_length)?;
                if let Some(ms) = status.time_remaining_ms {
                    write!(f, ", {} s left", ms.div_ceil(1_000))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.recipient, self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(Event::ControlGranted.to_string(), "You have control");
        assert_eq!(Event::Queued { position: 2 }.to_string(), "You are #2 in queue");
        assert_eq!(Event::Timeout.to_string(), "Your time is up");
    }

    #[test]
    fn test_status_display() {
        let status = Status {
            controlling: true,
            position: Some(0),
            queue_length: 3,
            time_remaining_ms: Some(90_500),
        };
        let n = Notification::to(SessionId(4), Event::StatusUpdate(status));
        assert_eq!(n.to_string(), "[#4] controlling, 3 in queue, 91 s left");

        let n = Notification::broadcast(Event::QueueLengthChanged { queue_length: 1 });
        assert_eq!(n.to_string(), "[all] 1 in queue");
    }
}
