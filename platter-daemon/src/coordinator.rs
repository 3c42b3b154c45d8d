//! Coordinator
//!
//! Glue between the inbound session events, the access scheduler and the
//! actuation layer. Every channel command passes the controller check
//! before it reaches the pins, and every change of controller (timeout or
//! the controller leaving) stops all channels first.
//!
//! The controller check and the write it guards run under the scheduler
//! lock, as does the stop on a handover. A command from a session that just
//! lost the controls is either applied before the handover stop or rejected.
//!
//! All methods take `&self`; the coordinator is shared between the tick
//! task and the dispatch task.

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{error, info, warn};
use thiserror::Error;

use platter_core::actuation::ChannelCommand;
use platter_core::config::{ChannelId, PlatterConfig};
use platter_core::scheduler::{AccessScheduler, SessionId};
use platter_drivers::{ActuationError, ActuationLayer};
use platter_hal::PinDriver;

use crate::events::{Event, Inbound, Notification, Status};

/// Rejected commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("You do not have control")]
    Unauthorized,
    #[error("Invalid channel {0}")]
    InvalidChannel(ChannelId),
    #[error("Apply failed: {0}")]
    ApplyFailed(ActuationError),
}

impl CommandError {
    /// Notification telling `session` why its request failed
    pub fn notification(&self, session: SessionId) -> Notification {
        let event = match self {
            CommandError::ApplyFailed(e) => Event::ActuationFault {
                channel: e.channel(),
                message: self.to_string(),
            },
            _ => Event::Rejected {
                message: self.to_string(),
            },
        };
        Notification::to(session, event)
    }
}

impl From<ActuationError> for CommandError {
    fn from(e: ActuationError) -> Self {
        match e {
            ActuationError::InvalidChannel(id) => CommandError::InvalidChannel(id),
            e => CommandError::ApplyFailed(e),
        }
    }
}

/// Outcome of one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Deliver these and keep going
    Notify(Vec<Notification>),
    /// The pins are released; exit with this code
    Stopped(i32),
}

/// Shared controller state
pub struct Coordinator<M: RawMutex, D: PinDriver> {
    scheduler: AccessScheduler<M>,
    actuation: ActuationLayer<M, D>,
}

impl<M: RawMutex, D: PinDriver> Coordinator<M, D> {
    /// Bring up the actuation layer (all channels braking) and an empty queue
    pub fn new(config: &PlatterConfig, driver: D) -> Result<Self, ActuationError> {
        Ok(Self {
            scheduler: AccessScheduler::new(config.timeout_ms),
            actuation: ActuationLayer::new(config, driver)?,
        })
    }

    /// The access queue
    pub fn scheduler(&self) -> &AccessScheduler<M> {
        &self.scheduler
    }

    /// The channel outputs
    pub fn actuation(&self) -> &ActuationLayer<M, D> {
        &self.actuation
    }

    /// Apply one inbound event
    ///
    /// Rejections become notifications for the requesting session.
    pub fn dispatch(&self, event: Inbound, now_ms: u64) -> Dispatch {
        let notifications = match event {
            Inbound::Connect(session) => self.connect(session, now_ms),
            Inbound::Disconnect(session) => self.disconnect(session, now_ms),
            Inbound::Command {
                session,
                channel,
                command,
            } => self
                .command(session, channel, command)
                .unwrap_or_else(|e| vec![e.notification(session)]),
            Inbound::StopAll(session) => self
                .stop_all_request(session)
                .unwrap_or_else(|e| vec![e.notification(session)]),
            Inbound::Status(session) => vec![self.status(session, now_ms)],
            Inbound::Shutdown => {
                return match self.shutdown() {
                    Ok(()) => Dispatch::Stopped(0),
                    Err(e) => {
                        error!("Shutdown failed: {}", e);
                        Dispatch::Stopped(1)
                    }
                };
            }
        };
        Dispatch::Notify(notifications)
    }

    /// A session connected: queue it and tell it where it stands
    pub fn connect(&self, session: SessionId, now_ms: u64) -> Vec<Notification> {
        let position = self.scheduler.join(session, now_ms);
        let mut out = Vec::new();

        if position == 0 {
            info!("granting control to {}", session);
            out.push(Notification::to(session, Event::ControlGranted));
        } else {
            info!("queuing {} at position {}", session, position);
            out.push(Notification::to(session, Event::Queued { position }));
        }
        out.push(self.status(session, now_ms));
        out.push(self.queue_length_changed());
        out
    }

    /// A session disconnected
    ///
    /// If it held the controls every channel is stopped and the next
    /// session is told it now has control.
    pub fn disconnect(&self, session: SessionId, now_ms: u64) -> Vec<Notification> {
        let mut out = Vec::new();
        let left = self.scheduler.leave_with(session, now_ms, |position| {
            (position == 0).then(|| self.actuation.stop_all())
        });
        let Some((_, handover)) = left else {
            return out;
        };

        if let Some(stopped) = handover {
            info!("controller {} disconnected", session);
            self.report_handover(stopped, &mut out);
            if let Some(next) = self.scheduler.current_controller() {
                out.extend(self.grant(next, now_ms));
            }
        }
        out.push(self.queue_length_changed());
        out
    }

    /// Apply a channel command on behalf of a session
    ///
    /// Only the controller may command. On an actuation fault every channel
    /// is stopped as a precaution and the fault is returned.
    pub fn command(
        &self,
        session: SessionId,
        channel: ChannelId,
        command: ChannelCommand,
    ) -> Result<Vec<Notification>, CommandError> {
        let command = command.clamped();
        let applied = self
            .scheduler
            .with_controller(session, || self.actuation.set_channel(channel, command))
            .ok_or_else(|| Self::unauthorized(session))?;

        match applied {
            Ok(_) => Ok(vec![Notification::to(
                session,
                Event::ChannelUpdated { channel, command },
            )]),
            Err(e @ ActuationError::Fault { .. }) => {
                if let Err(stop) = self.actuation.stop_all() {
                    warn!("precautionary stop failed: {}", stop);
                }
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stop every channel on behalf of the controller
    pub fn stop_all_request(&self, session: SessionId) -> Result<Vec<Notification>, CommandError> {
        self.scheduler
            .with_controller(session, || self.actuation.stop_all())
            .ok_or_else(|| Self::unauthorized(session))??;
        Ok(vec![Notification::to(session, Event::AllStopped)])
    }

    /// Periodic timeout check
    ///
    /// On a timeout the channels are stopped, the evicted session moves to
    /// the back of the queue and the next session gets control.
    pub fn tick(&self, now_ms: u64) -> Vec<Notification> {
        let mut out = Vec::new();
        let Some((evicted, stopped)) = self
            .scheduler
            .tick_with(now_ms, |_| self.actuation.stop_all())
        else {
            return out;
        };

        self.report_handover(stopped, &mut out);
        out.push(Notification::to(evicted, Event::Timeout));
        out.push(self.status(evicted, now_ms));
        if let Some(next) = self.scheduler.current_controller() {
            out.extend(self.grant(next, now_ms));
        }
        out.push(self.queue_length_changed());
        out
    }

    /// Current status of a session
    pub fn status(&self, session: SessionId, now_ms: u64) -> Notification {
        let position = self.scheduler.position_of(session);
        Notification::to(
            session,
            Event::StatusUpdate(Status {
                controlling: position == Some(0),
                position,
                queue_length: self.scheduler.len(),
                time_remaining_ms: self.scheduler.time_remaining(session, now_ms),
            }),
        )
    }

    /// Stop everything and release the pins
    pub fn shutdown(&self) -> Result<(), ActuationError> {
        info!("shutting down");
        self.actuation.shutdown()
    }

    fn unauthorized(session: SessionId) -> CommandError {
        warn!("rejected command from {}: not the controller", session);
        CommandError::Unauthorized
    }

    fn grant(&self, session: SessionId, now_ms: u64) -> [Notification; 2] {
        info!("granting control to {}", session);
        [
            Notification::to(session, Event::ControlGranted),
            self.status(session, now_ms),
        ]
    }

    fn report_handover(&self, stopped: Result<(), ActuationError>, out: &mut Vec<Notification>) {
        if let Err(e) = stopped {
            warn!("stop on handover failed: {}", e);
            out.push(Notification::broadcast(Event::ActuationFault {
                channel: e.channel(),
                message: e.to_string(),
            }));
        }
    }

    fn queue_length_changed(&self) -> Notification {
        Notification::broadcast(Event::QueueLengthChanged {
            queue_length: self.scheduler.len(),
        })
    }
}
