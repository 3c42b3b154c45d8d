//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! The transport and the signal handler feed [`INBOUND`]; everything the
//! coordinator wants to tell the sessions goes through [`OUTBOUND`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use platter_daemon::{Inbound, Notification};

/// Channel capacity for inbound session events
const INBOUND_CHANNEL_SIZE: usize = 16;

/// Channel capacity for outbound notifications
const OUTBOUND_CHANNEL_SIZE: usize = 32;

/// Inbound session events
pub static INBOUND: Channel<CriticalSectionRawMutex, Inbound, INBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Notifications waiting for delivery
pub static OUTBOUND: Channel<CriticalSectionRawMutex, Notification, OUTBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Signalled once the pins are released; carries the exit code
pub static SHUTDOWN_DONE: Signal<CriticalSectionRawMutex, i32> = Signal::new();
